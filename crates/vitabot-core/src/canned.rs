//! Canned-response engine: deterministic keyword matching over the product map.
//!
//! This is the last line of defense when the remote model is unreachable and the
//! entire behavior in demo mode, so `canned_reply` is total: it never fails and
//! always returns non-empty text. Keyword groups are checked in a fixed order;
//! the first matching group wins and unmatched input gets the overview reply.

const ENERGY_REPLY: &str = r#"🔥 **VITAHUB Energy** - функциональный напиток на основе научных исследований!

✨ **Реальный состав:**
• Инозитол - ускоряет метаболизм жиров
• Холин - эффективное снижение веса
• Кофеин - для энергии и концентрации
• Рибофлавин (витамин B2)
• Без сахара (подсластитель сукралоза)

📦 **Упаковка:** Алюминиевая банка 330 мл
🍓 **Вкус:** Арбуз-клубника

⚡ **Научно доказанные эффекты:**
• Продуктивность и выносливость
• Концентрация внимания
• Контроль веса без потери мышечной массы
• Защита печени
• Профилактика инсулинорезистентности

🔬 **УТП:** Без тревоги, без сердцебиения, использует жир для энергии!"#;

const DETOX_REPLY: &str = r#"🌿 **VITAHUB Detox** - ежедневный помощник в поддержании здоровья!

✨ **Реальный состав:**
• Глутатион - мощный антиоксидант
• Витамин Е - защита клеток
• Без сахара (подсластитель сукралоза)

📦 **Упаковка:** Алюминиевая банка 330 мл, зеленый логотип

⚡ **Научно доказанные эффекты:**
• Защита печени - глутатион нейтрализует токсины
• Контроль веса - регулирует гормоны ожирения
• Антивозрастной эффект - защищает ДНК в митохондриях
• Профилактика вирусных инфекций - поддержка иммунитета
• Чистая кожа - снижает окислительный стресс
• Защита репродуктивной системы

🔬 **УТП:** Природный детокс на клеточном уровне!"#;

const ANTISTRESS_REPLY: &str = r#"😌 **VITAHUB Antistress** - спокойствие и здоровый сон!

✨ **Реальный состав:**
• Триптофан - предшественник серотонина (гормон счастья)
• Глицин - успокаивает нервную систему
• Мелатонин - нормализует сон и jet-lag
• Таурин - снижает плохой холестерин на 10%
• Цитрат магния - поддержка нервной системы

📦 **Упаковка:** Алюминиевая банка 330 мл, фиолетовый логотип
🍃 **Вкус:** Мохито (сдержанный)

⚡ **Научно доказанные эффекты:**
• Улучшает сон и нормализует режим
• Повышает настроение через синтез серотонина
• Адаптация к смене часовых поясов (jet-lag)
• Снижает предоперационную тревожность на 13%
• Спокойствие и продуктивность
• Подавляет голод

🔬 **УТП:** Адаптоген для спортсменов, без сахара!"#;

const COMPOSITION_REPLY: &str = r#"📋 **Состав всех продуктов VITAHUB:**

🔥 **Energy:**
• Инозитол - ускоряет метаболизм жиров
• Холин - снижает массу тела
• Кофеин - энергия и концентрация
• Рибофлавин (витамин B2)

🌿 **Detox:**
• Глутатион - мощный антиоксидант
• Витамин Е - защита клеток

😌 **Antistress:**
• Триптофан - синтез серотонина
• Глицин - успокаивает нервы
• Мелатонин - нормализует сон
• Таурин - защищает сердце
• Цитрат магния

✅ **Все без сахара** - используется сукралоза"#;

const BUY_REPLY: &str = r#"🛒 **Где купить VITAHUB:**

🌐 **Официальный сайт:** vitahub.ru
📱 **Интернет-магазины:** Wildberries, Ozon
🏪 **Розница:** Спортмастер, Дикси (в крупных городах)

💰 **Цены:**
• Energy: ~300-400₽
• Detox: ~350-450₽
• Antistress: ~400-500₽

🚚 Доставка по всей России, часто есть акции и скидки!"#;

const OVERVIEW_REPLY: &str = r#"👋 Привет! Я ассистент VITAHUB! Расскажу о наших функциональных напитках:

🔥 **VITAHUB Energy** - энергия и фокус
• Инозитол, Холин, Кофеин
• Вкус: арбуз-клубника

🌿 **VITAHUB Detox** - очищение и антиоксиданты
• Глутатион, Витамин Е
• Защита печени и молодость

😌 **VITAHUB Antistress** - сон и спокойствие
• Триптофан, Мелатонин, Глицин
• Вкус: мохито

✅ **Все напитки без сахара** с научно доказанными эффектами!

О каком продукте хотите узнать подробнее?"#;

/// Keyword groups in priority order; the first group with any substring hit wins.
const KEYWORD_GROUPS: [(&[&str], &str); 5] = [
    (&["energy", "энерг"], ENERGY_REPLY),
    (&["detox", "детокс"], DETOX_REPLY),
    (&["antistress", "антистресс", "стресс", "сон", "мелатонин"], ANTISTRESS_REPLY),
    (&["состав", "ингредиент"], COMPOSITION_REPLY),
    (&["где купить", "заказать", "цена"], BUY_REPLY),
];

/// Deterministic fallback reply for a user message. Total: always returns
/// non-empty text, case-insensitive substring matching.
pub fn canned_reply(user_text: &str) -> &'static str {
    let lower = user_text.to_lowercase();
    for (keywords, reply) in KEYWORD_GROUPS {
        if keywords.iter().any(|k| lower.contains(k)) {
            return reply;
        }
    }
    OVERVIEW_REPLY
}

/// Static prompt list served by `GET /api/suggestions`.
pub const SUGGESTED_QUESTIONS: [&str; 8] = [
    "Что такое VITAHUB Energy?",
    "Какой состав у напитка?",
    "Как правильно употреблять?",
    "Есть ли противопоказания?",
    "Чем отличается от обычных энергетиков?",
    "Подходит ли для диеты?",
    "Где купить VITAHUB?",
    "Какие преимущества для здоровья?",
];

const FOLLOW_UP_POOL: [&str; 5] = [
    "Какой состав у напитка?",
    "Есть ли противопоказания?",
    "Как правильно употреблять?",
    "Где можно купить?",
    "Чем отличается от конкурентов?",
];

/// Follow-up prompts attached to every chat reply (at most `n`).
pub fn follow_up_suggestions(n: usize) -> Vec<&'static str> {
    FOLLOW_UP_POOL.iter().copied().take(n).collect()
}
