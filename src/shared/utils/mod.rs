use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

pub mod nanoid;

/// YYYY-MM-DD（ゼロ埋め）形式
static DATE_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("日付パターンが不正です"));

/// HH:MM形式
static TIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("時刻パターンが不正です"));

/// 日付キーとして使える文字列かどうかを判定する
///
/// ゼロ埋めの YYYY-MM-DD 形式かつ実在する日付のみ有効。
/// この形式なら辞書順と時系列順が一致する。
pub fn is_valid_date_key(date_str: &str) -> bool {
    DATE_KEY_PATTERN.is_match(date_str)
        && NaiveDate::parse_from_str(date_str, "%Y-%m-%d").is_ok()
}

/// 日付文字列のバリデーション
///
/// # 引数
/// * `date_str` - 日付文字列（YYYY-MM-DD形式）
///
/// # 戻り値
/// 有効な日付の場合はOk(())、無効な場合はエラー
pub fn validate_date(date_str: &str) -> AppResult<()> {
    if !is_valid_date_key(date_str) {
        return Err(AppError::validation(
            "日付はYYYY-MM-DD形式で入力してください",
        ));
    }
    Ok(())
}

/// HH:MM形式の時刻かどうかを判定する
pub fn is_valid_time(time_str: &str) -> bool {
    TIME_PATTERN.is_match(time_str)
}

/// 指定タイムゾーンでの今日の日付キー（YYYY-MM-DD）を取得
pub fn today_key(tz: &Tz) -> String {
    date_key_at(Utc::now(), tz)
}

/// 指定時刻の日付キー（YYYY-MM-DD）を取得
pub fn date_key_at(instant: DateTime<Utc>, tz: &Tz) -> String {
    instant.with_timezone(tz).format("%Y-%m-%d").to_string()
}

/// 指定時刻をHH:MM形式で取得
pub fn format_hhmm(instant: DateTime<Utc>, tz: &Tz) -> String {
    instant.with_timezone(tz).format("%H:%M").to_string()
}

/// 必須フィールドのバリデーション
///
/// # 引数
/// * `text` - 検証対象の文字列
/// * `message` - 空だった場合にユーザーへ表示するメッセージ
///
/// # 戻り値
/// 前後の空白を除いた文字列、空の場合はエラー
pub fn require_text(text: &str, message: &str) -> AppResult<String> {
    let trimmed = normalize_string(text);
    if trimmed.is_empty() {
        return Err(AppError::validation(message));
    }
    Ok(trimmed)
}

/// 文字列の正規化（前後の空白を削除）
pub fn normalize_string(text: &str) -> String {
    text.trim().to_string()
}

/// 価格入力を数値に変換する
///
/// # 変換規則
/// - 空欄（空白のみを含む）は 0
/// - 数値として解釈できない場合はエラー
/// - 負の数・無限大・NaN はエラー
pub fn parse_price(input: &str) -> AppResult<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }

    let price: f64 = trimmed
        .parse()
        .map_err(|_| AppError::validation("価格は数値で入力してください"))?;

    if !price.is_finite() {
        return Err(AppError::validation("無効な価格です"));
    }
    if price < 0.0 {
        return Err(AppError::validation("価格は0以上で入力してください"));
    }

    Ok(price)
}

/// 金額を3桁区切りでフォーマット
///
/// 小数点以下が0の場合は整数として表示する
pub fn format_amount(amount: f64) -> String {
    let (sign, abs) = if amount < 0.0 { ("-", -amount) } else { ("", amount) };
    let formatted = if abs.fract() == 0.0 {
        format!("{abs:.0}")
    } else {
        format!("{abs:.2}")
    };

    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (formatted, None),
    };

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}
