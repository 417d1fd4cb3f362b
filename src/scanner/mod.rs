use crate::error::{FaceMatchError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff"];

/// キー（小文字のファイル名語幹）→ 画像パス
#[derive(Debug, Clone, Default)]
pub struct KeyedImageMap {
    folder: PathBuf,
    entries: BTreeMap<String, PathBuf>,
    /// キーごとの破棄された（上書きされた）パス数
    duplicates: BTreeMap<String, usize>,
}

impl KeyedImageMap {
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn get(&self, key: &str) -> Option<&Path> {
        self.entries.get(key).map(PathBuf::as_path)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// キー順（辞書順）に走査
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn duplicates(&self) -> &BTreeMap<String, usize> {
        &self.duplicates
    }

    fn insert(&mut self, key: String, path: PathBuf) {
        if let Some(previous) = self.entries.insert(key.clone(), path) {
            let dropped = self.duplicates.entry(key.clone()).or_insert(0);
            *dropped += 1;
            tracing::warn!(
                key = %key,
                dropped = %previous.display(),
                kept = ?self.entries.get(&key),
                collisions = *dropped,
                folder = %self.folder.display(),
                "duplicate key"
            );
        }
    }
}

impl FromIterator<(String, PathBuf)> for KeyedImageMap {
    fn from_iter<I: IntoIterator<Item = (String, PathBuf)>>(iter: I) -> Self {
        let mut map = KeyedImageMap::default();
        for (key, path) in iter {
            map.insert(key, path);
        }
        map
    }
}

/// 対応画像拡張子か（大文字小文字を区別しない）
pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

/// ファイル名からキーを抽出（拡張子を除き小文字化）
pub fn image_key(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .filter(|s| !s.is_empty())
}

/// フォルダ直下の画像をスキャンしてキー → パスのマップを作成
///
/// ファイル名順に走査するため、重複キーは名前順で最後のファイルが残る。
pub fn scan_folder(folder: &Path) -> Result<KeyedImageMap> {
    if !folder.is_dir() {
        return Err(FaceMatchError::FolderNotFound(folder.display().to_string()));
    }

    let folder = folder.canonicalize()?;
    let mut map = KeyedImageMap {
        folder: folder.clone(),
        ..Default::default()
    };

    for entry in WalkDir::new(&folder)
        .min_depth(1)
        .max_depth(1)  // 直下のみ（再帰しない）
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let supported = path
            .extension()
            .map(|ext| is_image_extension(&ext.to_string_lossy()))
            .unwrap_or(false);
        if !supported {
            continue;
        }

        if let Some(key) = image_key(path) {
            map.insert(key, path.to_path_buf());
        }
    }

    tracing::debug!(folder = %folder.display(), images = map.len(), "scanned folder");

    Ok(map)
}
