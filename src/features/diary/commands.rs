use crate::features::auth::UserId;
use crate::features::diary::models::{CreateEntryDto, PhotoChange, PhotoRef, UpdateEntryDto};
use crate::features::diary::repository::{self, NewEntry};
use crate::features::photos::PhotoPathManager;
use crate::features::sync::{Collection, SnapshotSubscription};
use crate::shared::errors::AppResult;
use crate::shared::utils::nanoid::generate_record_id;
use crate::shared::utils::{format_hhmm, require_text, today_key, validate_date};
use crate::AppState;
use chrono::Utc;

const EMPTY_TEXT_MESSAGE: &str = "内容を入力してください";

/// 日記を保存する
///
/// 写真がある場合は先にアップロードし、失敗した場合は何も書き込まない。
///
/// # 引数
/// * `state` - アプリケーション状態
/// * `dto` - 日記作成用DTO
///
/// # 戻り値
/// 作成された日記のID
pub fn save_entry(state: &AppState, dto: CreateEntryDto) -> AppResult<String> {
    let user = state.current_user()?;
    let text = require_text(&dto.text, EMPTY_TEXT_MESSAGE)?;

    let date = match dto.date {
        Some(date) => {
            validate_date(&date)?;
            date
        }
        None => today_key(&state.config.timezone),
    };

    let now = Utc::now();
    let photo = match &dto.photo {
        Some(upload) => {
            let path = PhotoPathManager::new_entry_photo_path(
                &user,
                now.timestamp_millis(),
                &upload.file_name,
            );
            Some(upload_photo(state, &user, path, &upload.bytes)?)
        }
        None => None,
    };

    let entry = NewEntry {
        id: generate_record_id(),
        text,
        date,
        time: format_hhmm(now, &state.config.timezone),
        created_at_millis: now.timestamp_millis(),
        photo,
    };

    let result = {
        let db = state.db()?;
        repository::create(&db, &user, &entry)
    };
    if let Err(e) = result {
        // 書き込みに失敗した場合はアップロード済みの写真を残さない
        if let Some(photo) = &entry.photo {
            discard_photo(state, photo);
        }
        return Err(e);
    }

    log::info!("日記を保存しました: id={}, date={}", entry.id, entry.date);
    publish_entries(state, &user)?;
    Ok(entry.id)
}

/// 日記を編集する
///
/// # 引数
/// * `state` - アプリケーション状態
/// * `id` - 日記ID
/// * `dto` - 日記更新用DTO
pub fn update_entry(state: &AppState, id: &str, dto: UpdateEntryDto) -> AppResult<()> {
    let user = state.current_user()?;
    let text = require_text(&dto.text, EMPTY_TEXT_MESSAGE)?;

    let current = {
        let db = state.db()?;
        repository::find_photo(&db, &user, id)?
    };

    let (next, replaced) = match dto.photo {
        PhotoChange::Keep => (current.clone(), None),
        PhotoChange::Remove => (None, current.clone()),
        PhotoChange::Replace(upload) => {
            let path = PhotoPathManager::replacement_photo_path(
                &user,
                id,
                Utc::now().timestamp_millis(),
                &upload.file_name,
            );
            let uploaded = upload_photo(state, &user, path, &upload.bytes)?;
            (Some(uploaded), current.clone())
        }
    };

    let result = {
        let db = state.db()?;
        repository::update(&db, &user, id, &text, next.as_ref())
    };
    if let Err(e) = result {
        if next != current {
            if let Some(photo) = &next {
                discard_photo(state, photo);
            }
        }
        return Err(e);
    }

    if let Some(old) = &replaced {
        discard_photo(state, old);
    }

    log::info!("日記を更新しました: id={id}");
    publish_entries(state, &user)
}

/// 日記を削除する
///
/// 添付写真も削除する（失敗してもエントリーの削除は続行）。
pub fn delete_entry(state: &AppState, id: &str) -> AppResult<()> {
    let user = state.current_user()?;

    let photo = {
        let db = state.db()?;
        let photo = repository::find_photo(&db, &user, id)?;
        repository::delete(&db, &user, id)?;
        photo
    };

    if let Some(photo) = &photo {
        discard_photo(state, photo);
    }

    log::info!("日記を削除しました: id={id}");
    publish_entries(state, &user)
}

/// 日記コレクションの購読を開始する
///
/// 現在の一覧を配信してから購読を返すため、最初のスナップショットは常に最新。
pub fn subscribe_entries(state: &AppState) -> AppResult<SnapshotSubscription> {
    let user = state.current_user()?;
    publish_entries(state, &user)?;
    state.hub.subscribe(&user, Collection::Entries)
}

/// 現在の一覧を配信する
///
/// 一覧の読み出しから採番までデータベースのロックを保持し、
/// 後から読んだ一覧ほど大きいシーケンス番号になるようにする。
fn publish_entries(state: &AppState, user: &UserId) -> AppResult<()> {
    let db = state.db()?;
    let records = repository::list(&db, user)?;
    state.hub.publish(user, Collection::Entries, records)?;
    Ok(())
}

fn upload_photo(state: &AppState, user: &UserId, path: String, bytes: &[u8]) -> AppResult<PhotoRef> {
    PhotoPathManager::validate_user_access(user, &path)?;
    let image_url = state.photos.upload(&path, bytes).map_err(|e| {
        log::error!("写真のアップロードに失敗しました: path={path}, error={e}");
        e
    })?;
    Ok(PhotoRef {
        image_url,
        image_path: path,
    })
}

/// 写真を削除する（失敗は記録して無視する）
fn discard_photo(state: &AppState, photo: &PhotoRef) {
    if photo.image_path.is_empty() {
        return;
    }
    if let Err(e) = state.photos.delete(&photo.image_path) {
        log::warn!(
            "写真の削除に失敗しました（無視します）: path={}, error={e}",
            photo.image_path
        );
    }
}
