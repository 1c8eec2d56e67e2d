use std::time::Duration;

use lettre::{
    address::AddressError,
    message::{Mailbox, MultiPart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::ExposeSecret;

use crate::config::EmailClientConfig;

#[derive(thiserror::Error, Debug)]
pub enum EmailClientError {
    #[error("invalid email address: {0}")]
    Address(#[from] AddressError),
    #[error("failed to build email message.")]
    MessageBuild(#[from] lettre::error::Error),
    #[error("SMTP transport error.")]
    SmtpTransport(#[from] lettre::transport::smtp::Error),
}

/// 通过SMTP中继把联系表单转发到支持邮箱
pub struct EmailClient {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    recipient: Mailbox,
}

impl EmailClient {
    fn new(
        transport: AsyncSmtpTransport<Tokio1Executor>,
        sender: Mailbox,
        recipient: Mailbox,
    ) -> Self {
        Self {
            transport,
            sender,
            recipient,
        }
    }

    pub fn from_config(config: &EmailClientConfig) -> Result<Self, EmailClientError> {
        let sender = Mailbox::new(
            Some(config.sender_name.clone()),
            config.sender_email.parse::<Address>()?,
        );
        let recipient = Mailbox::new(None, config.support_email.parse::<Address>()?);

        Ok(Self::new(build_transport(config)?, sender, recipient))
    }

    /// 构造邮件: 发件人与收件人来自配置，回复地址为提交者邮箱。
    /// 提交者邮箱不符合RFC 5322时省略Reply-To，邮件照常发送
    pub fn build_message(
        &self,
        reply_to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<Message, EmailClientError> {
        let mut builder = Message::builder()
            .from(self.sender.clone())
            .to(self.recipient.clone());
        match reply_to.parse::<Address>() {
            Ok(address) => builder = builder.reply_to(Mailbox::new(None, address)),
            Err(e) => tracing::warn!(
                error.message = %e,
                "submitter address is not a valid mailbox, sending without Reply-To."
            ),
        }

        let message = builder
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(
                text_body.to_owned(),
                html_body.to_owned(),
            ))?;

        Ok(message)
    }

    #[tracing::instrument(name = "sending email", skip_all)]
    pub async fn send(
        &self,
        reply_to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailClientError> {
        let message = self.build_message(reply_to, subject, text_body, html_body)?;
        let response = self.transport.send(message).await?;
        tracing::info!(code = %response.code(), "relay accepted the message.");

        Ok(())
    }
}

fn build_transport(
    config: &EmailClientConfig,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailClientError> {
    let builder = if config.secure {
        AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
    } else {
        // 服务器声明支持STARTTLS时才升级
        let tls_parameters = TlsParameters::new(config.smtp_host.clone())?;
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            .tls(Tls::Opportunistic(tls_parameters))
    };

    let mut builder = builder
        .port(config.smtp_port)
        .timeout(Some(Duration::from_millis(config.timeout_milliseconds)));

    // 用户名和密码都配置时才进行认证
    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        builder = builder.credentials(Credentials::new(
            username.clone(),
            password.expose_secret().to_owned(),
        ));
    }

    Ok(builder.build())
}
