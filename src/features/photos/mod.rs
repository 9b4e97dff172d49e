/// 写真添付機能モジュール
///
/// - 写真ストアの境界（`PhotoStore`）
/// - ローカルディレクトリ実装
/// - オブジェクトパスの生成と検証
pub mod paths;
pub mod store;

pub use paths::PhotoPathManager;
pub use store::{LocalPhotoStore, PhotoStore};
