/// Russian numeral pluralization: one/few/many forms chosen by the last
/// digit, with 11-14 always taking the many form.
pub fn plural_ru(count: i64, one: &str, few: &str, many: &str) -> String {
    let n = count.abs();
    let last_two = n % 100;
    let form = if (11..=14).contains(&last_two) {
        many
    } else {
        match n % 10 {
            1 => one,
            2..=4 => few,
            _ => many,
        }
    };
    format!("{count} {form}")
}

pub fn lessons_ru(count: i64) -> String {
    plural_ru(count, "урок", "урока", "уроков")
}

pub fn quests_ru(count: i64) -> String {
    plural_ru(count, "задание", "задания", "заданий")
}

pub fn checklist_items_ru(count: i64) -> String {
    plural_ru(count, "пункт чек-листа", "пункта чек-листа", "пунктов чек-листа")
}

pub fn days_ru(count: i64) -> String {
    plural_ru(count, "день", "дня", "дней")
}

pub fn points_ru(count: i64) -> String {
    plural_ru(count, "балл", "балла", "баллов")
}
