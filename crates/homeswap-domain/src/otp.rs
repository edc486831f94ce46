//! One-time passcode delivery channel and code format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How an OTP reaches the registrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpMethod {
    Email,
    Phone,
}

impl OtpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for OtpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown otp method: {0}")]
pub struct UnknownOtpMethod(pub String);

impl FromStr for OtpMethod {
    type Err = UnknownOtpMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            other => Err(UnknownOtpMethod(other.to_owned())),
        }
    }
}

/// OTP codes are 4 decimal digits, `1000..=9999`.
pub const OTP_MIN: u16 = 1000;
pub const OTP_MAX: u16 = 9999;

/// `true` if `code` has the shape of an issued OTP.
pub fn is_well_formed_otp(code: &str) -> bool {
    code.len() == 4 && code.bytes().all(|b| b.is_ascii_digit())
}
