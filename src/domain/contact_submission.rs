use once_cell::sync::Lazy;
use tera::Tera;

use crate::routes::ContactRequest;

use super::{ContactEmail, ContactMessage, ContactName, ContactTopic};

/// 字段校验失败，按 name → email → topic → message 的顺序返回第一个错误
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required.")]
    MissingName,
    #[error("Valid email is required.")]
    InvalidEmail,
    #[error("Topic is required.")]
    MissingTopic,
    #[error("Message is required.")]
    MissingMessage,
}

#[derive(Debug)]
pub struct ContactSubmission {
    pub name: ContactName,
    pub email: ContactEmail,
    pub topic: ContactTopic,
    pub message: ContactMessage,
}

impl TryFrom<ContactRequest> for ContactSubmission {
    type Error = ValidationError;

    fn try_from(request: ContactRequest) -> Result<Self, Self::Error> {
        let name = ContactName::parse(&request.name).ok_or(ValidationError::MissingName)?;
        let email = ContactEmail::parse(&request.email).ok_or(ValidationError::InvalidEmail)?;
        let topic = ContactTopic::parse(&request.topic).ok_or(ValidationError::MissingTopic)?;
        let message =
            ContactMessage::parse(&request.message).ok_or(ValidationError::MissingMessage)?;

        Ok(Self {
            name,
            email,
            topic,
            message,
        })
    }
}

impl ContactSubmission {
    pub fn subject(&self) -> String {
        format!(
            "New contact form submission: {} from {} <{}>",
            self.topic.as_ref(),
            self.name.as_ref(),
            self.email.as_ref()
        )
    }

    pub fn text_body(&self) -> String {
        format!(
            "Name: {}\nEmail: {}\nTopic: {}\n\nMessage:\n{}",
            self.name.as_ref(),
            self.email.as_ref(),
            self.topic.as_ref(),
            self.message.as_ref()
        )
    }

    /// HTML正文，所有字段经模板自动转义，留言的换行转为`<br>`
    pub fn html_body(&self) -> Result<String, tera::Error> {
        let mut context = tera::Context::new();
        context.insert("name", self.name.as_ref());
        context.insert("email", self.email.as_ref());
        context.insert("topic", self.topic.as_ref());
        // lines()同时去掉\r\n中的\r
        context.insert("message_lines", &self.message.as_ref().lines().collect::<Vec<_>>());
        TEMPLATES.render(HTML_BODY, &context)
    }
}

// 以.html结尾的模板名会启用自动转义
const HTML_BODY: &str = "contact_email.html";

static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_template(HTML_BODY, include_str!("contact_email.html"))
        .expect("contact email template must parse.");
    tera
});
