//! 認証機能モジュール
//!
//! 外部のIDプロバイダーが返すユーザーIDを保持するだけの境界。
//! ログインしていない場合は全てのビューが空になる。

use crate::shared::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// IDプロバイダーが発行する不透明なユーザーID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// 空のIDは受け付けない
    pub fn new(raw: impl Into<String>) -> AppResult<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(AppError::validation("ユーザーIDが空です"));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 現在の認証状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    user: Option<UserId>,
}

impl AuthState {
    /// 未ログイン状態
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// IDプロバイダーからの状態変化を反映する
    pub fn on_auth_state_changed(&mut self, user: Option<UserId>) {
        match &user {
            Some(user) => log::info!("ログインしました: user={user}"),
            None => log::info!("ログアウトしました"),
        }
        self.user = user;
    }

    pub fn current_user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    /// 書き込み操作の前にログイン済みであることを確認する
    pub fn require_user(&self) -> AppResult<&UserId> {
        self.user.as_ref().ok_or_else(AppError::unauthenticated)
    }
}
