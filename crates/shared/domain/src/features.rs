use bitflags::bitflags;

pub const ITSM: &str = "itsm";
pub const NCCM: &str = "nccm";
pub const TELECOM_OSS: &str = "telecom_oss";

bitflags! {
    /// Optional product modules toggled through settings.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct FeatureSet: u32 {
        const ITSM = 1 << 0;
        const NCCM = 1 << 1;
        const TELECOM_OSS = 1 << 2;

        const ALL = Self::ITSM.bits() | Self::NCCM.bits() | Self::TELECOM_OSS.bits();
    }
}

impl FeatureSet {
    /// Names of the enabled modules, in declaration order.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        [(Self::ITSM, ITSM), (Self::NCCM, NCCM), (Self::TELECOM_OSS, TELECOM_OSS)]
            .into_iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
            .collect()
    }
}

impl From<&str> for FeatureSet {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            ITSM => Self::ITSM,
            NCCM => Self::NCCM,
            TELECOM_OSS => Self::TELECOM_OSS,
            "all" | "*" => Self::ALL,
            _ => Self::empty(),
        }
    }
}
