use crate::core::progress::FormProgressCache;
use crate::domain::ports::DraftStore;
use crate::utils::error::{Result, SiteError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 欄位型別，決定命令列文字如何轉成 JSON 值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    List,
}

impl FieldKind {
    pub fn coerce(self, raw: &str) -> serde_json::Value {
        match self {
            FieldKind::Text => serde_json::Value::String(raw.to_string()),
            FieldKind::Number => match raw.trim().parse::<u32>() {
                Ok(n) => serde_json::Value::from(n),
                Err(_) => serde_json::Value::String(raw.to_string()),
            },
            FieldKind::List => match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(list @ serde_json::Value::Array(_)) => list,
                _ => serde_json::Value::Array(
                    raw.split(',')
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(|item| serde_json::Value::String(item.to_string()))
                        .collect(),
                ),
            },
        }
    }

    fn accepts(self, value: &serde_json::Value) -> bool {
        match (self, value) {
            (_, serde_json::Value::Null) => true,
            (FieldKind::Text, serde_json::Value::String(_)) => true,
            (FieldKind::Number, serde_json::Value::Number(n)) => {
                n.as_u64().is_some_and(|n| n <= u32::MAX as u64)
            }
            (FieldKind::List, serde_json::Value::Array(items)) => items.iter().all(|i| i.is_string()),
            _ => false,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "a whole number",
            FieldKind::List => "a list of text values",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardStep {
    pub id: String,
    pub title: String,
    pub required_fields: Vec<String>,
    pub field_kinds: Vec<(String, FieldKind)>,
}

impl WizardStep {
    pub fn new(id: &str, title: &str, required_fields: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            required_fields: required_fields.iter().map(|f| f.to_string()).collect(),
            field_kinds: Vec::new(),
        }
    }

    pub fn with_kinds(mut self, kinds: &[(&str, FieldKind)]) -> Self {
        self.field_kinds
            .extend(kinds.iter().map(|(field, kind)| (field.to_string(), *kind)));
        self
    }

    pub fn kind_of(&self, field: &str) -> Option<FieldKind> {
        self.field_kinds
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, kind)| *kind)
    }
}

/// 持久化到草稿的精靈狀態
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardDraft {
    pub current_step: usize,
    pub data: BTreeMap<String, serde_json::Map<String, serde_json::Value>>,
}

/// Multi-step form controller. Every state change is written through the
/// progress cache so the form can be resumed later.
pub struct Wizard<S: DraftStore> {
    form_id: String,
    steps: Vec<WizardStep>,
    state: WizardDraft,
    cache: FormProgressCache<S>,
}

impl<S: DraftStore> Wizard<S> {
    /// 從草稿還原；沒有草稿時從第一步開始
    pub async fn resume(form_id: &str, steps: Vec<WizardStep>, store: S) -> Result<Self> {
        if steps.is_empty() {
            return Err(SiteError::ConfigError {
                message: format!("wizard {} has no steps", form_id),
            });
        }

        let cache = FormProgressCache::new(store);
        let mut state = cache.load(form_id, WizardDraft::default()).await;

        if state.current_step >= steps.len() {
            tracing::warn!(
                "⚠️ Stored step {} out of range for {}, clamping",
                state.current_step,
                form_id
            );
            state.current_step = steps.len() - 1;
        }

        Ok(Self {
            form_id: form_id.to_string(),
            steps,
            state,
            cache,
        })
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn steps(&self) -> &[WizardStep] {
        &self.steps
    }

    pub fn current_index(&self) -> usize {
        self.state.current_step
    }

    pub fn current_step(&self) -> &WizardStep {
        &self.steps[self.state.current_step]
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn is_first(&self) -> bool {
        self.state.current_step == 0
    }

    pub fn is_last(&self) -> bool {
        self.state.current_step + 1 == self.steps.len()
    }

    pub fn progress_percent(&self) -> f64 {
        (self.state.current_step + 1) as f64 / self.steps.len() as f64 * 100.0
    }

    pub fn step_data(&self, step_id: &str) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.state.data.get(step_id)
    }

    /// 依步驟順序尋找欄位值
    pub fn value(&self, field: &str) -> Option<&serde_json::Value> {
        self.steps
            .iter()
            .filter_map(|step| self.state.data.get(&step.id))
            .find_map(|data| data.get(field))
    }

    pub async fn update(&mut self, field: &str, value: serde_json::Value) {
        let step_id = self.current_step().id.clone();
        self.state
            .data
            .entry(step_id)
            .or_default()
            .insert(field.to_string(), value);
        self.persist().await;
    }

    /// 依欄位宣告的型別轉換命令列文字；未宣告的欄位視為文字
    pub async fn update_raw(&mut self, field: &str, raw: &str) {
        let kind = self.field_kind(field).unwrap_or(FieldKind::Text);
        self.update(field, kind.coerce(raw)).await;
    }

    pub fn field_kind(&self, field: &str) -> Option<FieldKind> {
        self.steps.iter().find_map(|step| step.kind_of(field))
    }

    pub async fn next(&mut self) -> Result<usize> {
        if self.is_last() {
            return Err(SiteError::validation(
                "step",
                format!("Already at the final step ({})", self.current_step().title),
            ));
        }

        self.validate_step(self.state.current_step)?;
        self.state.current_step += 1;
        self.persist().await;

        tracing::debug!(
            "{} moved to step {}/{}",
            self.form_id,
            self.state.current_step + 1,
            self.steps.len()
        );
        Ok(self.state.current_step)
    }

    pub async fn back(&mut self) -> usize {
        if self.state.current_step > 0 {
            self.state.current_step -= 1;
            self.persist().await;
        }
        self.state.current_step
    }

    /// 驗證所有步驟並合併資料。草稿保留到呼叫 `complete` 為止。
    pub fn submit(&self) -> Result<serde_json::Value> {
        if !self.is_last() {
            return Err(SiteError::validation(
                "step",
                "Please complete every step before submitting",
            ));
        }

        for index in 0..self.steps.len() {
            self.validate_step(index)?;
        }

        let mut merged = serde_json::Map::new();
        for step in &self.steps {
            if let Some(data) = self.state.data.get(&step.id) {
                merged.extend(data.clone());
            }
        }

        Ok(serde_json::Value::Object(merged))
    }

    pub fn submit_as<T: DeserializeOwned>(&self) -> Result<T> {
        let merged = self.submit()?;
        serde_json::from_value(merged).map_err(|e| {
            SiteError::validation("form", format!("The application is not complete: {}", e))
        })
    }

    /// 送出成功後清除草稿
    pub async fn complete(&mut self) {
        self.cache.clear(&self.form_id).await;
        self.state = WizardDraft::default();
    }

    pub async fn discard(&mut self) {
        self.complete().await;
        tracing::info!("🗑️ Discarded draft for {}", self.form_id);
    }

    fn validate_step(&self, index: usize) -> Result<()> {
        let step = &self.steps[index];
        let data = self.state.data.get(&step.id);

        for field in &step.required_fields {
            let present = data
                .and_then(|d| d.get(field))
                .map(|value| !is_blank(value))
                .unwrap_or(false);

            if !present {
                return Err(SiteError::validation(
                    field.as_str(),
                    format!("{} is required ({})", field_label(field), step.title),
                ));
            }
        }

        for (field, value) in data.into_iter().flatten() {
            if let Some(kind) = self.field_kind(field) {
                if !kind.accepts(value) {
                    return Err(SiteError::validation(
                        field.as_str(),
                        format!(
                            "{} must be {} ({})",
                            field_label(field),
                            kind.describe(),
                            step.title
                        ),
                    ));
                }
            }
        }

        Ok(())
    }

    async fn persist(&self) {
        self.cache.save(&self.form_id, &self.state).await;
    }
}

fn is_blank(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.trim().is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn field_label(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryDraftStore;
    use serde_json::json;

    fn steps() -> Vec<WizardStep> {
        vec![
            WizardStep::new("business", "Business Information", &["business_name"]),
            WizardStep::new("contact", "Contact Details", &["email"]),
            WizardStep::new("review", "Review", &[]),
        ]
    }

    #[tokio::test]
    async fn test_progress_percent_follows_current_step() {
        let mut wizard = Wizard::resume("test", steps(), MemoryDraftStore::new())
            .await
            .unwrap();

        assert!((wizard.progress_percent() - 100.0 / 3.0).abs() < 1e-9);

        wizard.update("business_name", json!("Green Bowl")).await;
        wizard.next().await.unwrap();
        assert!((wizard.progress_percent() - 200.0 / 3.0).abs() < 1e-9);

        wizard.update("email", json!("hi@greenbowl.test")).await;
        wizard.next().await.unwrap();
        assert_eq!(wizard.progress_percent(), 100.0);
    }

    #[tokio::test]
    async fn test_next_blocks_on_missing_required_field() {
        let mut wizard = Wizard::resume("test", steps(), MemoryDraftStore::new())
            .await
            .unwrap();

        wizard.update("business_name", json!("   ")).await;
        let err = wizard.next().await.unwrap_err();

        assert_eq!(wizard.current_index(), 0);
        assert_eq!(
            err.user_friendly_message(),
            "Business name is required (Business Information)"
        );
    }

    #[tokio::test]
    async fn test_back_stops_at_first_step() {
        let mut wizard = Wizard::resume("test", steps(), MemoryDraftStore::new())
            .await
            .unwrap();

        assert_eq!(wizard.back().await, 0);
        wizard.update("business_name", json!("Green Bowl")).await;
        wizard.next().await.unwrap();
        assert_eq!(wizard.back().await, 0);
        assert!(wizard.is_first());
    }

    #[tokio::test]
    async fn test_next_at_last_step_is_an_error() {
        let store = MemoryDraftStore::new();
        store
            .set(
                "form_progress:test",
                r#"{"current_step": 2, "data": {"business": {"business_name": "A"}, "contact": {"email": "a@b.co"}}}"#,
            )
            .await
            .unwrap();

        let mut wizard = Wizard::resume("test", steps(), store).await.unwrap();
        assert!(wizard.is_last());
        assert!(wizard.next().await.is_err());
        assert_eq!(wizard.current_index(), 2);
    }

    #[tokio::test]
    async fn test_resume_restores_saved_state() {
        let store = MemoryDraftStore::new();
        {
            let mut wizard = Wizard::resume("vendor", steps(), store.clone()).await.unwrap();
            wizard.update("business_name", json!("Green Bowl")).await;
            wizard.next().await.unwrap();
            wizard.update("email", json!("hi@greenbowl.test")).await;
        }

        let wizard = Wizard::resume("vendor", steps(), store).await.unwrap();
        assert_eq!(wizard.current_index(), 1);
        assert_eq!(wizard.value("business_name"), Some(&json!("Green Bowl")));
        assert_eq!(wizard.value("email"), Some(&json!("hi@greenbowl.test")));
    }

    #[tokio::test]
    async fn test_resume_clamps_out_of_range_step() {
        let store = MemoryDraftStore::new();
        store
            .set("form_progress:test", r#"{"current_step": 9}"#)
            .await
            .unwrap();

        let wizard = Wizard::resume("test", steps(), store).await.unwrap();
        assert_eq!(wizard.current_index(), 2);
    }

    #[tokio::test]
    async fn test_submit_merges_steps_and_complete_clears_draft() {
        let store = MemoryDraftStore::new();
        let mut wizard = Wizard::resume("test", steps(), store.clone()).await.unwrap();

        assert!(wizard.submit().is_err());

        wizard.update("business_name", json!("Green Bowl")).await;
        wizard.next().await.unwrap();
        wizard.update("email", json!("hi@greenbowl.test")).await;
        wizard.next().await.unwrap();

        let merged = wizard.submit().unwrap();
        assert_eq!(
            merged,
            json!({"business_name": "Green Bowl", "email": "hi@greenbowl.test"})
        );
        assert!(!store.is_empty());

        wizard.complete().await;
        assert!(store.is_empty());
        assert_eq!(wizard.current_index(), 0);
    }

    fn typed_steps() -> Vec<WizardStep> {
        vec![
            WizardStep::new("contact", "Contact Details", &["phone"])
                .with_kinds(&[("phone", FieldKind::Text), ("years", FieldKind::Number)]),
            WizardStep::new("kitchen", "Kitchen", &["cuisines"])
                .with_kinds(&[("cuisines", FieldKind::List)]),
            WizardStep::new("review", "Review", &[]),
        ]
    }

    #[test]
    fn test_field_kind_coerce() {
        assert_eq!(FieldKind::Text.coerce("5550102"), json!("5550102"));
        assert_eq!(FieldKind::Number.coerce(" 7 "), json!(7));
        assert_eq!(FieldKind::Number.coerce("seven"), json!("seven"));
        assert_eq!(FieldKind::List.coerce("Vegan"), json!(["Vegan"]));
        assert_eq!(FieldKind::List.coerce("Thai, Vegan,"), json!(["Thai", "Vegan"]));
        assert_eq!(FieldKind::List.coerce(r#"["Thai"]"#), json!(["Thai"]));
    }

    #[tokio::test]
    async fn test_update_raw_keeps_digits_as_text() {
        let mut wizard = Wizard::resume("typed", typed_steps(), MemoryDraftStore::new())
            .await
            .unwrap();

        wizard.update_raw("phone", "5550102").await;
        wizard.update_raw("years", "4").await;
        wizard.update_raw("nickname", "42").await;

        assert_eq!(wizard.value("phone"), Some(&json!("5550102")));
        assert_eq!(wizard.value("years"), Some(&json!(4)));
        assert_eq!(wizard.value("nickname"), Some(&json!("42")));
        assert!(wizard.next().await.is_ok());
    }

    #[tokio::test]
    async fn test_next_rejects_value_of_wrong_kind() {
        let mut wizard = Wizard::resume("typed", typed_steps(), MemoryDraftStore::new())
            .await
            .unwrap();

        wizard.update("phone", json!(5550102)).await;
        let err = wizard.next().await.unwrap_err();
        assert!(matches!(err, SiteError::ValidationError { ref field, .. } if field == "phone"));
        assert_eq!(
            err.user_friendly_message(),
            "Phone must be text (Contact Details)"
        );

        wizard.update("phone", json!("5550102")).await;
        wizard.update_raw("years", "many").await;
        let err = wizard.next().await.unwrap_err();
        assert!(matches!(err, SiteError::ValidationError { ref field, .. } if field == "years"));
        assert_eq!(wizard.current_index(), 0);
    }

    #[derive(Debug, Deserialize)]
    struct TypedForm {
        #[allow(dead_code)]
        phone: String,
        #[allow(dead_code)]
        cuisines: Vec<String>,
        #[allow(dead_code)]
        owner: String,
    }

    #[tokio::test]
    async fn test_submit_as_mismatch_is_a_validation_error() {
        let mut wizard = Wizard::resume("typed", typed_steps(), MemoryDraftStore::new())
            .await
            .unwrap();
        wizard.update_raw("phone", "5550102").await;
        wizard.next().await.unwrap();
        wizard.update_raw("cuisines", "Vegan").await;
        wizard.next().await.unwrap();

        let err = wizard.submit_as::<TypedForm>().unwrap_err();
        assert!(matches!(err, SiteError::ValidationError { ref field, .. } if field == "form"));
        assert!(err.user_friendly_message().contains("missing field `owner`"));
    }

    #[tokio::test]
    async fn test_empty_steps_rejected() {
        let result = Wizard::resume("empty", Vec::new(), MemoryDraftStore::new()).await;
        assert!(result.is_err());
    }
}
