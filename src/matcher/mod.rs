mod types;

pub use types::MatchSet;

use crate::error::{FaceMatchError, Result};
use crate::scanner::KeyedImageMap;
use face_match_common::MatchPair;

/// 2つのキーマップの共通キーでペアを作成
///
/// KeyedImageMapはキー順に走査されるため、結果も辞書順になる。
pub fn match_keys(weac: &KeyedImageMap, ug: &KeyedImageMap) -> Result<MatchSet> {
    let mut set = MatchSet::default();

    for key in weac.keys() {
        match (weac.get(key), ug.get(key)) {
            (Some(weac_path), Some(ug_path)) => set.pairs.push(MatchPair {
                key: key.to_string(),
                weac_path: weac_path.to_path_buf(),
                ug_path: ug_path.to_path_buf(),
            }),
            _ => set.weac_only.push(key.to_string()),
        }
    }

    set.ug_only = ug
        .keys()
        .filter(|key| !weac.contains_key(key))
        .map(str::to_string)
        .collect();

    if set.pairs.is_empty() {
        return Err(FaceMatchError::NoCommonStudents);
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn map(folder: &str, keys: &[&str]) -> KeyedImageMap {
        keys.iter()
            .map(|k| (k.to_string(), PathBuf::from(format!("/{}/{}.jpg", folder, k))))
            .collect()
    }

    #[test]
    fn test_intersection() {
        let weac = map("weac", &["a", "b", "c"]);
        let ug = map("ug", &["b", "c", "d"]);

        let set = match_keys(&weac, &ug).unwrap();
        let keys: Vec<_> = set.pairs.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "c"]);
        assert_eq!(set.weac_only, vec!["a"]);
        assert_eq!(set.ug_only, vec!["d"]);
        assert_eq!(set.weac_only_count(), 1);
        assert_eq!(set.ug_only_count(), 1);
    }

    #[test]
    fn test_pair_paths() {
        let weac = map("weac", &["b"]);
        let ug = map("ug", &["b"]);

        let set = match_keys(&weac, &ug).unwrap();
        assert_eq!(set.pairs[0].weac_path, PathBuf::from("/weac/b.jpg"));
        assert_eq!(set.pairs[0].ug_path, PathBuf::from("/ug/b.jpg"));
    }

    #[test]
    fn test_sorted_order() {
        let weac = map("weac", &["zed", "amy", "kim"]);
        let ug = map("ug", &["kim", "zed", "amy"]);

        let set = match_keys(&weac, &ug).unwrap();
        let keys: Vec<_> = set.pairs.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["amy", "kim", "zed"]);
    }

    #[test]
    fn test_no_common_students() {
        let weac = map("weac", &["a", "b"]);
        let ug = map("ug", &["c", "d"]);

        let result = match_keys(&weac, &ug);
        assert!(matches!(result, Err(FaceMatchError::NoCommonStudents)));
    }

    #[test]
    fn test_empty_maps() {
        let result = match_keys(&KeyedImageMap::default(), &map("ug", &["a"]));
        assert!(matches!(result, Err(FaceMatchError::NoCommonStudents)));
    }
}
