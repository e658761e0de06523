use crate::core::upload::FileUploader;
use crate::domain::model::{buckets, UploadFile};
use crate::domain::ports::Backend;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    fn pass(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiagnosticsReport {
    pub checks: Vec<CheckResult>,
}

impl DiagnosticsReport {
    pub fn push(&mut self, check: CheckResult) {
        if check.passed {
            tracing::info!("✅ {}: {}", check.name, check.detail);
        } else {
            tracing::warn!("❌ {}: {}", check.name, check.detail);
        }
        self.checks.push(check);
    }

    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

/// 環境變數檢查，缺少時只警告
pub fn environment_check(missing: &[&str]) -> CheckResult {
    if missing.is_empty() {
        CheckResult::pass("environment", "SUPABASE_URL and SUPABASE_ANON_KEY are set")
    } else {
        CheckResult::fail("environment", format!("missing {}", missing.join(", ")))
    }
}

/// Setup checks against a live backend. A failing check never stops the rest.
pub struct Diagnostics<B: Backend> {
    uploader: FileUploader<B>,
}

impl<B: Backend> Diagnostics<B> {
    pub fn new(uploader: FileUploader<B>) -> Self {
        Self { uploader }
    }

    pub async fn run(&self, report: &mut DiagnosticsReport) {
        match self.uploader.backend().ping().await {
            Ok(()) => report.push(CheckResult::pass("connectivity", "backend is reachable")),
            Err(e) => report.push(CheckResult::fail("connectivity", e.to_string())),
        }

        for bucket in buckets::ALL {
            let name = format!("bucket {}", bucket);
            match self.uploader.ensure_bucket(bucket).await {
                Ok(true) => report.push(CheckResult::pass(name, "created")),
                Ok(false) => report.push(CheckResult::pass(name, "exists")),
                Err(e) => report.push(CheckResult::fail(name, e.to_string())),
            }
        }

        let probe = UploadFile::new(
            "connection-test.txt",
            "text/plain",
            format!("connection test {}", chrono::Utc::now().to_rfc3339()).into_bytes(),
        );
        match self
            .uploader
            .upload(buckets::TEST_UPLOADS, &probe, Some("diagnostics"), None)
            .await
        {
            Ok(object) => report.push(CheckResult::pass("test upload", object.public_url)),
            Err(e) => report.push(CheckResult::fail("test upload", e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_check() {
        assert!(environment_check(&[]).passed);

        let check = environment_check(&["SUPABASE_URL", "SUPABASE_ANON_KEY"]);
        assert!(!check.passed);
        assert_eq!(check.detail, "missing SUPABASE_URL, SUPABASE_ANON_KEY");
    }

    #[test]
    fn test_report_failures() {
        let mut report = DiagnosticsReport::default();
        report.push(CheckResult::pass("connectivity", "ok"));
        assert!(report.all_passed());

        report.push(CheckResult::fail("bucket test-uploads", "denied"));
        assert!(!report.all_passed());
        assert_eq!(report.failures().count(), 1);
    }
}
