use crate::shared::errors::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// 写真（バイナリ）ストアの境界
///
/// コアはアップロード結果のURLとパスの組を記録するだけで、
/// バイト列の扱いはこの実装に任せる。
pub trait PhotoStore: Send + Sync {
    /// バイト列を保存し、参照用URLを返す
    fn upload(&self, path: &str, bytes: &[u8]) -> AppResult<String>;

    /// 保存済みのオブジェクトを削除する
    fn delete(&self, path: &str) -> AppResult<()>;
}

/// ローカルディレクトリを使う写真ストア
#[derive(Debug, Clone)]
pub struct LocalPhotoStore {
    root: PathBuf,
}

impl LocalPhotoStore {
    /// # 引数
    /// * `root` - 保存先のルートディレクトリ
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)));
        if path.is_empty() || escapes {
            return Err(AppError::validation(format!("写真パスが不正です: {path}")));
        }
        Ok(self.root.join(relative))
    }
}

impl PhotoStore for LocalPhotoStore {
    fn upload(&self, path: &str, bytes: &[u8]) -> AppResult<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, bytes)?;

        log::info!("写真を保存しました: path={path}, size={}", bytes.len());
        Ok(format!("file://{}", target.display()))
    }

    fn delete(&self, path: &str) -> AppResult<()> {
        let target = self.resolve(path)?;
        if !target.exists() {
            return Err(AppError::not_found(format!("写真 {path}")));
        }
        fs::remove_file(&target)?;
        log::info!("写真を削除しました: path={path}");
        Ok(())
    }
}
