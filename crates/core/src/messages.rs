//! User-facing messages

pub const RATE_LIMITED: &str = "请求过于频繁，请稍后再试";
pub const NETWORK_FAILURE: &str = "网络连接失败，请检查您的网络";
pub const LOGIN_FAILED: &str = "登录失败，请重试";
pub const SEND_CODE_FAILED: &str = "发送验证码失败";
pub const REGISTER_FAILED: &str = "注册失败，请重试";
pub const NO_REFRESH_TOKEN: &str = "No refresh token available";
