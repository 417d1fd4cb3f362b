use face_match_common::MatchPair;

/// WEAC/UGキー照合の結果
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    /// 共通キーのペア（キー順）
    pub pairs: Vec<MatchPair>,
    /// WEACのみに存在するキー（キー順）
    pub weac_only: Vec<String>,
    /// UGのみに存在するキー（キー順）
    pub ug_only: Vec<String>,
}

impl MatchSet {
    pub fn weac_only_count(&self) -> usize {
        self.weac_only.len()
    }

    pub fn ug_only_count(&self) -> usize {
        self.ug_only.len()
    }
}
