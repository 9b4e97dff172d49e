use crate::features::auth::UserId;
use crate::features::sync::{Collection, SnapshotSubscription};
use crate::features::todos::models::{CreateTodoDto, TodoKind};
use crate::features::todos::repository::{self, NewTodo};
use crate::shared::errors::AppResult;
use crate::shared::utils::nanoid::generate_record_id;
use crate::shared::utils::{parse_price, require_text, today_key};
use crate::AppState;
use chrono::Utc;

/// TODO / 買い物アイテムを追加する
///
/// 日付は常に今日。価格は買い物のみ入力値を使い、TODOでは0。
///
/// # 引数
/// * `state` - アプリケーション状態
/// * `dto` - TODO作成用DTO
///
/// # 戻り値
/// 作成されたアイテムのID
pub fn add_todo(state: &AppState, dto: CreateTodoDto) -> AppResult<String> {
    let user = state.current_user()?;
    let text = require_text(&dto.text, "内容を入力してください")?;

    let price = match dto.kind {
        TodoKind::Shopping => parse_price(&dto.price)?,
        TodoKind::Todo => 0.0,
    };

    let todo = NewTodo {
        id: generate_record_id(),
        text,
        kind: dto.kind,
        price,
        date: today_key(&state.config.timezone),
        created_at_millis: Utc::now().timestamp_millis(),
    };

    {
        let db = state.db()?;
        repository::create(&db, &user, &todo)?;
    }

    log::info!(
        "TODOを追加しました: id={}, kind={}, price={}",
        todo.id,
        todo.kind.as_str(),
        todo.price
    );
    publish_todos(state, &user)?;
    Ok(todo.id)
}

/// 完了状態を反転する
///
/// # 戻り値
/// 反転後の完了状態
pub fn toggle_todo(state: &AppState, id: &str) -> AppResult<bool> {
    let user = state.current_user()?;

    let completed = {
        let db = state.db()?;
        let completed = !repository::find_completed(&db, &user, id)?;
        repository::set_completed(&db, &user, id, completed)?;
        completed
    };

    log::debug!("TODOの完了状態を変更しました: id={id}, completed={completed}");
    publish_todos(state, &user)?;
    Ok(completed)
}

/// TODOを削除する
pub fn delete_todo(state: &AppState, id: &str) -> AppResult<()> {
    let user = state.current_user()?;

    {
        let db = state.db()?;
        repository::delete(&db, &user, id)?;
    }

    log::info!("TODOを削除しました: id={id}");
    publish_todos(state, &user)
}

/// TODOコレクションの購読を開始する
pub fn subscribe_todos(state: &AppState) -> AppResult<SnapshotSubscription> {
    let user = state.current_user()?;
    publish_todos(state, &user)?;
    state.hub.subscribe(&user, Collection::Todos)
}

/// 現在の一覧を配信する
///
/// 一覧の読み出しから採番までデータベースのロックを保持し、
/// 後から読んだ一覧ほど大きいシーケンス番号になるようにする。
fn publish_todos(state: &AppState, user: &UserId) -> AppResult<()> {
    let db = state.db()?;
    let records = repository::list(&db, user)?;
    state.hub.publish(user, Collection::Todos, records)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::records::ingest_todos;
    use crate::shared::errors::AppError;
    use crate::test_support::{signed_in_state, signed_out_state};

    fn dto(text: &str, kind: TodoKind, price: &str) -> CreateTodoDto {
        CreateTodoDto {
            text: text.to_string(),
            kind,
            price: price.to_string(),
        }
    }

    #[test]
    fn test_add_todo_requires_user() {
        let state = signed_out_state();
        let err = add_todo(&state, dto("milk", TodoKind::Shopping, "100")).unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
        assert_eq!(err.user_message(), "ログインが必要です");
    }

    #[test]
    fn test_add_todo_validation() {
        let state = signed_in_state();

        let err = add_todo(&state, dto("  ", TodoKind::Todo, "")).unwrap_err();
        assert_eq!(err.user_message(), "内容を入力してください");

        assert!(matches!(
            add_todo(&state, dto("milk", TodoKind::Shopping, "abc")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            add_todo(&state, dto("milk", TodoKind::Shopping, "-5")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_add_todo_resolves_price_and_date() {
        let state = signed_in_state();
        add_todo(&state, dto("milk", TodoKind::Shopping, "3500")).unwrap();
        add_todo(&state, dto("bread", TodoKind::Shopping, "")).unwrap();
        add_todo(&state, dto("call mom", TodoKind::Todo, "999")).unwrap();

        let mut subscription = subscribe_todos(&state).unwrap();
        let items = ingest_todos(&subscription.latest().records);
        assert_eq!(items.len(), 3);

        let today = today_key(&state.config.timezone);
        assert!(items.iter().all(|item| item.date.as_deref() == Some(today.as_str())));
        assert!(items.iter().all(|item| !item.completed));

        let price_of = |text: &str| items.iter().find(|i| i.text == text).unwrap().price;
        assert_eq!(price_of("milk"), 3500.0);
        assert_eq!(price_of("bread"), 0.0);
        assert_eq!(price_of("call mom"), 0.0);
    }

    #[test]
    fn test_toggle_and_delete() {
        let state = signed_in_state();
        let id = add_todo(&state, dto("milk", TodoKind::Shopping, "100")).unwrap();

        assert!(toggle_todo(&state, &id).unwrap());
        assert!(!toggle_todo(&state, &id).unwrap());

        delete_todo(&state, &id).unwrap();
        assert!(matches!(toggle_todo(&state, &id), Err(AppError::NotFound(_))));
        assert!(matches!(delete_todo(&state, &id), Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_subscription_receives_toggle() {
        let state = signed_in_state();
        let id = add_todo(&state, dto("milk", TodoKind::Todo, "")).unwrap();

        let mut subscription = subscribe_todos(&state).unwrap();
        let first = subscription.latest();

        toggle_todo(&state, &id).unwrap();
        let next = subscription.next().await.unwrap();
        assert!(next.sequence > first.sequence);
        assert_eq!(next.records[0]["completed"], true);
    }

    #[test]
    fn test_concurrent_writers_publish_latest_list_last() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 25;

        let state = signed_in_state();
        let mut subscription = subscribe_todos(&state).unwrap();

        std::thread::scope(|scope| {
            for t in 0..THREADS {
                let state = &state;
                scope.spawn(move || {
                    for i in 0..PER_THREAD {
                        add_todo(state, dto(&format!("item {t}-{i}"), TodoKind::Todo, ""))
                            .unwrap();
                    }
                });
            }
        });

        // 最後に配信されたスナップショットはデータベースの全件を含む
        let latest = subscription.latest();
        assert_eq!(latest.records.len(), THREADS * PER_THREAD);
    }
}
