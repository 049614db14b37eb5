// Error codes for the PulseIQ client

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const MISSING_REQUIRED_FIELD: &str = "VALIDATION_1002";
    pub const PASSWORD_MISMATCH: &str = "VALIDATION_1003";
}

pub mod authentication {
    pub const INVALID_CREDENTIALS: &str = "AUTH_2001";
    pub const SESSION_MISSING: &str = "AUTH_2002";
}

pub mod storage {
    pub const READ_FAILED: &str = "STORAGE_4001";
    pub const WRITE_FAILED: &str = "STORAGE_4002";
    pub const CORRUPT_DATA: &str = "STORAGE_4003";
}

pub mod network {
    pub const UNREACHABLE: &str = "NET_5001";
    pub const MALFORMED_RESPONSE: &str = "NET_5002";
    pub const BAD_STATUS: &str = "NET_5003";
}

pub mod system {
    pub const CONFIGURATION: &str = "SYS_9001";
    pub const INTERNAL: &str = "SYS_9002";
}
