//! Time-based resource names
//!
//! Two runs within the same second produce the same names; the suffix only
//! keeps consecutive runs apart.

use crate::model::ResourceKind;
use chrono::{Datelike, Local, Timelike};
use vmflow_config::SuffixFormat;

/// Zero-padded timestamp digits: MMDDhhmmss, or YYYYMMDDhhmmss with the year
pub fn timestamp_suffix<T: Datelike + Timelike>(at: &T, format: SuffixFormat) -> String {
    let body = format!(
        "{:02}{:02}{:02}{:02}{:02}",
        at.month(),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    );
    match format {
        SuffixFormat::Short => body,
        SuffixFormat::WithYear => format!("{:04}{}", at.year(), body),
    }
}

/// Names for every resource a run creates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNames {
    pub suffix: String,
    pub virtual_network: String,
    pub public_ip: String,
    pub network_interface: String,
    pub virtual_machine: String,
    pub computer_name: String,
    pub os_disk: String,
    pub storage_account: String,
}

impl ResourceNames {
    pub fn new(prefix: &str, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        let virtual_machine = format!("{}vm{}", prefix, suffix);
        Self {
            virtual_network: format!("{}vnet{}", prefix, suffix),
            public_ip: format!("{}pip{}", prefix, suffix),
            network_interface: format!("{}nic{}", prefix, suffix),
            computer_name: virtual_machine.clone(),
            virtual_machine,
            os_disk: format!("{}osdisk{}", prefix, suffix),
            storage_account: format!("{}st{}", prefix, suffix),
            suffix,
        }
    }

    /// Names suffixed with the current local time
    pub fn now(prefix: &str, format: SuffixFormat) -> Self {
        Self::new(prefix, timestamp_suffix(&Local::now(), format))
    }

    pub fn for_kind(&self, kind: ResourceKind) -> &str {
        match kind {
            ResourceKind::VirtualNetwork => &self.virtual_network,
            ResourceKind::PublicIpAddress => &self.public_ip,
            ResourceKind::NetworkInterface => &self.network_interface,
            ResourceKind::VirtualMachine => &self.virtual_machine,
            ResourceKind::StorageAccount => &self.storage_account,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_short_suffix_zero_pads_each_field() {
        let suffix = timestamp_suffix(&at(2024, 3, 7, 9, 5, 1), SuffixFormat::Short);
        assert_eq!(suffix, "0307090501");
    }

    #[test]
    fn test_suffix_with_year() {
        let suffix = timestamp_suffix(&at(2024, 3, 7, 9, 5, 1), SuffixFormat::WithYear);
        assert_eq!(suffix, "20240307090501");
        let suffix = timestamp_suffix(&at(2009, 12, 31, 23, 59, 59), SuffixFormat::WithYear);
        assert_eq!(suffix, "20091231235959");
    }

    #[test]
    fn test_suffix_length_is_fixed() {
        let samples = [
            at(2024, 1, 1, 0, 0, 0),
            at(2024, 12, 31, 23, 59, 59),
            at(1999, 10, 9, 8, 7, 6),
        ];
        for t in &samples {
            let short = timestamp_suffix(t, SuffixFormat::Short);
            let long = timestamp_suffix(t, SuffixFormat::WithYear);
            assert_eq!(short.len(), 10);
            assert_eq!(long.len(), 14);
            assert!(short.chars().all(|c| c.is_ascii_digit()));
            assert!(long.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_same_second_collides() {
        let t = at(2024, 6, 1, 12, 0, 0);
        assert_eq!(
            timestamp_suffix(&t, SuffixFormat::Short),
            timestamp_suffix(&t, SuffixFormat::Short)
        );
    }

    #[test]
    fn test_resource_names() {
        let names = ResourceNames::new("vmflow", "0307090501");
        assert_eq!(names.virtual_network, "vmflowvnet0307090501");
        assert_eq!(names.public_ip, "vmflowpip0307090501");
        assert_eq!(names.network_interface, "vmflownic0307090501");
        assert_eq!(names.virtual_machine, "vmflowvm0307090501");
        assert_eq!(names.computer_name, names.virtual_machine);
        assert_eq!(names.storage_account, "vmflowst0307090501");
        assert_eq!(names.for_kind(ResourceKind::PublicIpAddress), names.public_ip);
    }

    #[test]
    fn test_storage_account_name_fits_limit() {
        let names = ResourceNames::new("abcdefgh", "20240307090501");
        assert_eq!(names.storage_account.len(), 24);
        assert!(
            names
                .storage_account
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }
}
