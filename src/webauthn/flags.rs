//! Authenticator data flag byte

use serde::{Deserialize, Serialize};

const USER_PRESENT: u8 = 1 << 0;
const USER_VERIFIED: u8 = 1 << 2;
const BACKUP_ELIGIBLE: u8 = 1 << 3;
const BACKUP_STATUS: u8 = 1 << 4;
const ATTESTED_DATA: u8 = 1 << 6;
const EXTENSION_DATA: u8 = 1 << 7;

/// Named flags of the authenticator data; bits 1 and 5 are reserved and dropped
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorFlags {
    pub user_present: bool,
    pub user_verified: bool,
    pub backup_eligible: bool,
    pub backup_status: bool,
    pub attested_data: bool,
    pub extension_data: bool,
}

impl AuthenticatorFlags {
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        Self {
            user_present: byte & USER_PRESENT != 0,
            user_verified: byte & USER_VERIFIED != 0,
            backup_eligible: byte & BACKUP_ELIGIBLE != 0,
            backup_status: byte & BACKUP_STATUS != 0,
            attested_data: byte & ATTESTED_DATA != 0,
            extension_data: byte & EXTENSION_DATA != 0,
        }
    }
}
