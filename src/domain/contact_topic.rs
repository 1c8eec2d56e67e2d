#[derive(Debug)]
pub struct ContactTopic(String);

impl ContactTopic {
    /// 表单中提供的主题选项，服务端不强制
    pub const SUGGESTIONS: [&'static str; 4] = ["General", "Partnership", "Press", "Support"];

    pub fn parse(s: &str) -> Option<ContactTopic> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.into()))
    }
}

impl AsRef<str> for ContactTopic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
