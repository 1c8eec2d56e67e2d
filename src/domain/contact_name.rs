#[derive(Debug)]
pub struct ContactName(String);

impl ContactName {
    /// 去除首尾空白后不能为空
    pub fn parse(s: &str) -> Option<ContactName> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.into()))
    }
}

impl AsRef<str> for ContactName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
