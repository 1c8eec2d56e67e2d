use once_cell::sync::Lazy;
use regex::Regex;

// local-part@domain.tld，不允许空白字符，`@`只能出现一次
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email pattern."));

#[derive(Debug)]
pub struct ContactEmail(String);

impl ContactEmail {
    /// 校验原始输入，首尾带空白的地址同样视为无效
    pub fn parse(s: &str) -> Option<ContactEmail> {
        if EMAIL_PATTERN.is_match(s) {
            Some(Self(s.into()))
        } else {
            None
        }
    }
}

impl AsRef<str> for ContactEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
