pub const DEFAULT_API_ENDPOINT: &str = "https://api.replicate.com/v1";
pub const DEFAULT_MODEL: &str =
    "ibm-granite/granite-3.3-8b-instruct:a325a0cacfb0aa9226e6bad1abe5385f1073f4c7f8c36e52ed040e5409e6c034";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

pub fn default_port() -> u16 {
    5000
}

pub fn default_request_timeout() -> u64 {
    120
}

pub fn default_poll_interval_ms() -> u64 {
    1000
}

pub fn default_min_tokens() -> u32 {
    0
}

pub fn default_penalty() -> f64 {
    0.0
}

pub fn is_default_penalty(value: &f64) -> bool {
    *value == default_penalty()
}

pub fn default_client_timeout() -> u64 {
    180
}

pub fn default_auto_adjust() -> bool {
    true
}
