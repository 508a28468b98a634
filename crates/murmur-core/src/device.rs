//! Keyword-based audio device resolution

use std::fmt;

use tracing::{debug, info};

use crate::error::{MurmurError, Result};

/// Stream direction a device is resolved for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// One enumerated audio endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub max_input_channels: u16,
    pub max_output_channels: u16,
}

impl DeviceInfo {
    pub fn channels(&self, direction: Direction) -> u16 {
        match direction {
            Direction::Input => self.max_input_channels,
            Direction::Output => self.max_output_channels,
        }
    }
}

/// Resolved reference to a hardware endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    /// Position in the catalog's enumeration order
    pub index: usize,
    pub name: String,
    pub direction: Direction,
}

/// Source of enumerable audio devices
pub trait DeviceCatalog {
    fn devices(&self) -> Result<Vec<DeviceInfo>>;
}

/// Find the first device whose name contains every keyword (case-insensitive)
/// and that has channels for `direction`.
pub fn resolve_device<C: DeviceCatalog + ?Sized>(
    catalog: &C,
    keywords: &[String],
    direction: Direction,
) -> Result<DeviceHandle> {
    let devices = catalog.devices()?;
    let wanted: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    for (index, device) in devices.iter().enumerate() {
        debug!(index, name = %device.name, "Considering {direction} device");
        let name = device.name.to_lowercase();
        if !wanted.iter().all(|k| name.contains(k.as_str())) {
            continue;
        }
        if device.channels(direction) == 0 {
            continue;
        }
        info!(index, name = %device.name, "Resolved {direction} device");
        return Ok(DeviceHandle {
            index,
            name: device.name.clone(),
            direction,
        });
    }

    Err(MurmurError::DeviceNotFound {
        keywords: keywords.to_vec(),
        direction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCatalog(Vec<DeviceInfo>);

    impl DeviceCatalog for FixedCatalog {
        fn devices(&self) -> Result<Vec<DeviceInfo>> {
            Ok(self.0.clone())
        }
    }

    fn device(name: &str, inputs: u16, outputs: u16) -> DeviceInfo {
        DeviceInfo {
            name: name.into(),
            max_input_channels: inputs,
            max_output_channels: outputs,
        }
    }

    fn pi_catalog() -> FixedCatalog {
        FixedCatalog(vec![
            device("bcm2835 Headphones: - (hw:0,0)", 0, 2),
            device("USB PnP Sound Device: Audio (hw:1,0)", 1, 0),
            device("USB PnP Sound Device: Audio (hw:1,0) out", 0, 2),
            device("default", 32, 32),
        ])
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_matches_case_insensitively() {
        let handle = resolve_device(&pi_catalog(), &words(&["USB"]), Direction::Input).unwrap();
        assert_eq!(handle.index, 1);
        assert_eq!(handle.direction, Direction::Input);
    }

    #[test]
    fn test_skips_devices_without_channels_for_direction() {
        let handle = resolve_device(&pi_catalog(), &words(&["usb"]), Direction::Output).unwrap();
        assert_eq!(handle.index, 2);

        let handle = resolve_device(&pi_catalog(), &words(&["bcm2835"]), Direction::Output).unwrap();
        assert_eq!(handle.index, 0);
    }

    #[test]
    fn test_requires_every_keyword() {
        let handle =
            resolve_device(&pi_catalog(), &words(&["usb", "out"]), Direction::Output).unwrap();
        assert_eq!(handle.index, 2);
    }

    #[test]
    fn test_no_match_carries_keywords() {
        let err = resolve_device(&pi_catalog(), &words(&["bcm2835"]), Direction::Input).unwrap_err();
        match err {
            MurmurError::DeviceNotFound { keywords, direction } => {
                assert_eq!(keywords, words(&["bcm2835"]));
                assert_eq!(direction, Direction::Input);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
