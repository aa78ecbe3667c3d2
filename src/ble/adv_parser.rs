//! Advertisement data (AD structure) parsing and building.
//!
//! Each AD structure is `[len, type, payload...]` where `len` counts the
//! type byte plus the payload.

use heapless::{String, Vec};

/// Maximum legacy advertising / scan response payload.
pub const MAX_ADV_LEN: usize = 31;

const AD_FLAGS: u8 = 0x01;
const AD_UUID128_INCOMPLETE: u8 = 0x06;
const AD_UUID128_COMPLETE: u8 = 0x07;
const AD_NAME_SHORT: u8 = 0x08;
const AD_NAME_COMPLETE: u8 = 0x09;

/// LE General Discoverable, BR/EDR not supported.
const FLAGS_GENERAL_DISC: u8 = 0x06;

/// Walks `(type, payload)` pairs, stopping at the first malformed entry.
struct AdStructures<'a> {
    data: &'a [u8],
}

impl<'a> Iterator for AdStructures<'a> {
    type Item = (u8, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let (&len, rest) = self.data.split_first()?;
        let len = len as usize;
        if len == 0 || len > rest.len() {
            self.data = &[];
            return None;
        }
        let (entry, tail) = rest.split_at(len);
        self.data = tail;
        Some((entry[0], &entry[1..]))
    }
}

fn ad_structures(data: &[u8]) -> AdStructures<'_> {
    AdStructures { data }
}

/// Check if raw advertisement data lists the given 128-bit service UUID
/// (little-endian), in a complete or incomplete list.
pub fn contains_service_uuid128(data: &[u8], uuid_le: &[u8; 16]) -> bool {
    ad_structures(data)
        .filter(|(ad_type, _)| {
            *ad_type == AD_UUID128_COMPLETE || *ad_type == AD_UUID128_INCOMPLETE
        })
        .any(|(_, uuids)| uuids.chunks_exact(16).any(|chunk| chunk == uuid_le))
}

/// Extract complete/shortened local name from advertisement data.
pub fn extract_device_name(data: &[u8]) -> String<32> {
    let mut name = String::new();
    let found = ad_structures(data)
        .find(|(ad_type, _)| *ad_type == AD_NAME_COMPLETE || *ad_type == AD_NAME_SHORT);

    match found {
        Some((_, bytes)) => {
            for &b in bytes {
                if name.push(b as char).is_err() {
                    break;
                }
            }
        }
        None => {
            let _ = name.push_str("Unknown");
        }
    }
    name
}

/// Advertising payload: flags plus the complete 128-bit service list.
pub fn build_adv_data(uuid_le: &[u8; 16]) -> Vec<u8, MAX_ADV_LEN> {
    let mut out = Vec::new();
    // 3 + 18 bytes always fits in 31.
    let _ = out.extend_from_slice(&[2, AD_FLAGS, FLAGS_GENERAL_DISC]);
    let _ = out.extend_from_slice(&[17, AD_UUID128_COMPLETE]);
    let _ = out.extend_from_slice(uuid_le);
    out
}

/// Scan response carrying the local name.
///
/// Names too long for one packet go out as a shortened name.
pub fn build_scan_data(name: &str) -> Vec<u8, MAX_ADV_LEN> {
    let max_name = MAX_ADV_LEN - 2;
    let (bytes, ad_type) = if name.len() > max_name {
        (&name.as_bytes()[..max_name], AD_NAME_SHORT)
    } else {
        (name.as_bytes(), AD_NAME_COMPLETE)
    };

    let mut out = Vec::new();
    let _ = out.push(bytes.len() as u8 + 1);
    let _ = out.push(ad_type);
    let _ = out.extend_from_slice(bytes);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SERVICE_UUID_LE;

    fn uuid_ad(ad_type: u8, uuid: &[u8; 16]) -> Vec<u8, 18> {
        let mut v = Vec::new();
        v.extend_from_slice(&[17, ad_type]).unwrap();
        v.extend_from_slice(uuid).unwrap();
        v
    }

    #[test]
    fn detect_service_uuid_in_advertisement() {
        let ad = uuid_ad(AD_UUID128_COMPLETE, &SERVICE_UUID_LE);
        assert!(contains_service_uuid128(&ad, &SERVICE_UUID_LE));
    }

    #[test]
    fn incomplete_uuid_list() {
        let ad = uuid_ad(AD_UUID128_INCOMPLETE, &SERVICE_UUID_LE);
        assert!(contains_service_uuid128(&ad, &SERVICE_UUID_LE));
    }

    #[test]
    fn other_service_uuid() {
        let mut other = SERVICE_UUID_LE;
        other[0] ^= 0xFF;
        let ad = uuid_ad(AD_UUID128_COMPLETE, &other);
        assert!(!contains_service_uuid128(&ad, &SERVICE_UUID_LE));
    }

    #[test]
    fn uuid_behind_flags_and_name() {
        let mut ad: Vec<u8, 31> = Vec::new();
        ad.extend_from_slice(&[0x02, 0x01, 0x06]).unwrap();
        ad.extend_from_slice(&[0x04, 0x09, b'P', b'a', b'd']).unwrap();
        ad.extend_from_slice(&uuid_ad(AD_UUID128_COMPLETE, &SERVICE_UUID_LE))
            .unwrap();
        assert!(contains_service_uuid128(&ad, &SERVICE_UUID_LE));
    }

    #[test]
    fn uuid_bytes_in_wrong_ad_type_are_ignored() {
        // Manufacturer data that happens to hold the UUID bytes.
        let ad = uuid_ad(0xFF, &SERVICE_UUID_LE);
        assert!(!contains_service_uuid128(&ad, &SERVICE_UUID_LE));
    }

    #[test]
    fn empty_advertisement_data() {
        assert!(!contains_service_uuid128(&[], &SERVICE_UUID_LE));
    }

    #[test]
    fn malformed_ad_length_zero() {
        assert!(!contains_service_uuid128(&[0x00], &SERVICE_UUID_LE));
    }

    #[test]
    fn truncated_structure_stops_parsing() {
        let ad = uuid_ad(AD_UUID128_COMPLETE, &SERVICE_UUID_LE);
        assert!(!contains_service_uuid128(&ad[..10], &SERVICE_UUID_LE));
    }

    #[test]
    fn extract_complete_local_name() {
        let ad_data = [
            0x09, 0x09, // len=9, type=0x09
            b'P', b'l', b'a', b'y', b'e', b'r', b'_', b'1',
        ];
        assert_eq!(extract_device_name(&ad_data).as_str(), "Player_1");
    }

    #[test]
    fn extract_shortened_local_name() {
        let ad_data = [0x05, 0x08, b'G', b'a', b'm', b'e'];
        assert_eq!(extract_device_name(&ad_data).as_str(), "Game");
    }

    #[test]
    fn no_name_in_advertisement() {
        let ad_data = [0x02, 0x01, 0x06];
        assert_eq!(extract_device_name(&ad_data).as_str(), "Unknown");
    }

    #[test]
    fn built_adv_data_is_found_by_parser() {
        let adv = build_adv_data(&SERVICE_UUID_LE);
        assert_eq!(adv.len(), 21);
        assert_eq!(&adv[..3], &[0x02, 0x01, 0x06]);
        assert!(contains_service_uuid128(&adv, &SERVICE_UUID_LE));
    }

    #[test]
    fn built_scan_data_carries_name() {
        let scan = build_scan_data("GameController_P1");
        assert_eq!(scan[1], AD_NAME_COMPLETE);
        assert_eq!(extract_device_name(&scan).as_str(), "GameController_P1");
    }

    #[test]
    fn long_name_is_shortened() {
        let long = "ThisControllerNameIsFarTooLongToFit";
        let scan = build_scan_data(long);
        assert_eq!(scan.len(), MAX_ADV_LEN);
        assert_eq!(scan[1], AD_NAME_SHORT);
        assert_eq!(extract_device_name(&scan).as_str(), &long[..29]);
    }
}
