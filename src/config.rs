use secrecy::SecretString;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Config {
    pub web: WebConfig,
    pub email_client: EmailClientConfig,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct WebConfig {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

impl WebConfig {
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct EmailClientConfig {
    pub smtp_host: String,
    #[serde(
        default = "default_smtp_port",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub smtp_port: u16,
    /// `true`: 连接即建立TLS (smtps)
    /// `false`: 服务器支持时升级为STARTTLS，否则明文
    #[serde(default = "default_secure")]
    pub secure: bool,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    pub sender_email: String,
    pub support_email: String,
    #[serde(
        default = "default_timeout_milliseconds",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub timeout_milliseconds: u64,
}

fn default_smtp_port() -> u16 {
    465
}

fn default_secure() -> bool {
    true
}

fn default_sender_name() -> String {
    "Website Contact".into()
}

fn default_timeout_milliseconds() -> u64 {
    10_000
}

/// 读取`config.yaml`，再用`APP_`前缀的环境变量覆盖
/// e.g. `APP_EMAIL_CLIENT__SMTP_HOST=smtp.example.com`
pub fn config() -> Result<Config, ::config::ConfigError> {
    ::config::Config::builder()
        .add_source(::config::File::new(
            "config.yaml",
            ::config::FileFormat::Yaml,
        ))
        .add_source(
            ::config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize::<Config>()
}
