#[derive(Debug)]
pub struct ContactMessage(String);

impl ContactMessage {
    pub fn parse(s: &str) -> Option<ContactMessage> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.into()))
    }
}

impl AsRef<str> for ContactMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
