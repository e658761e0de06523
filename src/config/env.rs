use std::env;

pub const SUPABASE_URL: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";

/// 兩個必要的環境變數；缺少時只顯示警告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendEnv {
    pub url: Option<String>,
    pub anon_key: Option<String>,
}

impl BackendEnv {
    pub fn from_env() -> Self {
        Self {
            url: read_var(SUPABASE_URL),
            anon_key: read_var(SUPABASE_ANON_KEY),
        }
    }

    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.url.is_none() {
            missing.push(SUPABASE_URL);
        }
        if self.anon_key.is_none() {
            missing.push(SUPABASE_ANON_KEY);
        }
        missing
    }

    pub fn is_configured(&self) -> bool {
        self.missing().is_empty()
    }
}

fn read_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
