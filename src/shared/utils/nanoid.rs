use nanoid::nanoid;

/// レコードID用のnanoIdを生成する
///
/// # 戻り値
/// 21文字のURL-safeなnanoId
pub fn generate_record_id() -> String {
    nanoid!()
}
