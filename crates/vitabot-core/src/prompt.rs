//! Prompt builder: fixed system instruction + a bounded window of prior turns.
//!
//! Two payload shapes are produced, depending on what the target provider
//! accepts: a single concatenated text prompt (Gemini-style single-part call)
//! and an explicit role-tagged message list (OpenAI-style chat format). Both
//! cap history inclusion to the most recent N turns; older turns are dropped
//! from context, not summarized.

use crate::session::{Role, Turn};

const VITAHUB_SYSTEM_PROMPT: &str = r#"Ты виртуальный ассистент VITAHUB - эксперт по функциональным напиткам.

КРИТИЧЕСКИ ВАЖНО:
- Отвечай ТОЛЬКО на основе предоставленной информации
- НЕ выдумывай состав, свойства или характеристики продуктов
- Если информации нет в базе данных - честно скажи "Точной информации об этом у меня нет"
- Используй только проверенные данные из карты смыслов VITAHUB

ПРОДУКТЫ VITAHUB:

1. **VITAHUB Energy** 🔥
**Состав:** Инозитол, Холин, Кофеин, Рибофлавин, без сахара (сукралоза)
**Упаковка:** Алюминиевая банка 330 мл, белый матовый, красный логотип
**Вкус:** Арбуз-клубника
**Эффекты:** продуктивность, выносливость, концентрация, контроль веса, улучшает настроение, подавляет голод
**УТП:** Без тревоги, без сердцебиения, использует жир для энергии, профилактика инсулинорезистентности

2. **VITAHUB Detox** 🌿
**Состав:** Глутатион, витамин Е, без сахара (сукралоза)
**Упаковка:** Алюминиевая банка 330 мл, белый матовый, зеленый логотип
**Эффекты:** защита печени, контроль веса, антивозрастной эффект, профилактика вирусных инфекций, чистая кожа, защита репродуктивной системы
**Слоган:** "Ежедневный помощник в поддержании здоровья"

3. **VITAHUB Antistress** 😌
**Состав:** Триптофан, Глицин, Мелатонин, Таурин, Цитрат магния, без сахара (сукралоза)
**Упаковка:** Алюминиевая банка 330 мл, белый матовый, фиолетовый логотип
**Вкус:** Мохито (сдержанный)
**Эффекты:** улучшает сон, настроение, спокойствие, продуктивность, адаптация к смене часовых поясов (jet-lag), подавляет голод
**УТП:** Нивелирует Jet lag, нормализует сон, адаптоген для спортсменов, профилактика инсулинорезистентности

Отвечай на русском языке, используй эмодзи для дружелюбности."#;

const CONSULTANT_SYSTEM_PROMPT: &str = "Ты — ассистент компании «ИТ‑Консультант» (Крым, Симферополь, ул. Залесская 41). \
Услуги: системные интеграции (ЛВС, видеонаблюдение, Mesh Wi‑Fi, умный дом), ИТ‑поддержка \
(абонентка, Linux‑серверы, сетевое оборудование, консультации), цифровой маркетинг \
(корпсайты, SMM, реклама, Telegram‑боты), орг‑правовые вопросы (аудит ИТ, продажа \
оборудования, юрист в сфере ИТ и цифрового права). Сегменты: стартапы, действующий бизнес, организации. \
Говори кратко, по‑русски, без воды. Если вопрос не по теме — мягко возвращай к услугам. \
Предлагай следующий шаг: бесплатную консультацию. Контакты: +7 (978) 800‑27‑27, office@consultant-it.ru. \
Если пользователь готов оставить заявку — последовательно, по одному вопросу, собери: имя, телефон, email (опц.), компанию/сайт (опц.), кратко задачу/сроки/бюджет. \
После сбора — подведи итог и спроси подтверждение на передачу менеджеру.";

/// The company id only selects prompt text; anything unknown gets the default
/// product assistant prompt.
pub fn system_prompt_for(company_id: &str) -> &'static str {
    match company_id {
        "consultant-it" => CONSULTANT_SYSTEM_PROMPT,
        _ => VITAHUB_SYSTEM_PROMPT,
    }
}

/// Assembles provider payloads from the system instruction, a capped history
/// window, and the new user message.
pub struct PromptBuilder {
    system_prompt: &'static str,
    max_history_turns: usize,
}

impl PromptBuilder {
    pub fn new(company_id: &str, max_history_turns: usize) -> Self {
        Self {
            system_prompt: system_prompt_for(company_id),
            max_history_turns,
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        self.system_prompt
    }

    fn history_window<'a>(&self, history: &'a [Turn]) -> &'a [Turn] {
        let skip = history.len().saturating_sub(self.max_history_turns);
        &history[skip..]
    }

    /// Single-text-prompt shape: system instruction, a role-labeled transcript
    /// of the history window, and the new user message, one string.
    pub fn render_flat(&self, history: &[Turn], new_message: &str) -> String {
        let transcript = self
            .history_window(history)
            .iter()
            .map(|t| {
                let label = match t.role {
                    Role::User => "Пользователь",
                    _ => "Ассистент",
                };
                format!("{}: {}", label, t.content)
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{}\n\nИстория диалога:\n{}\n\nПользователь: {}\n\nАссистент:",
            self.system_prompt, transcript, new_message
        )
    }

    /// Structured-messages shape: `[system, history…, user]` in order.
    pub fn build_messages(&self, history: &[Turn], new_message: &str) -> Vec<Turn> {
        let mut messages = Vec::with_capacity(self.max_history_turns + 2);
        messages.push(Turn::system(self.system_prompt));
        messages.extend_from_slice(self.history_window(history));
        messages.push(Turn::user(new_message));
        messages
    }

    /// Prepends the system instruction to caller-supplied messages (the
    /// structured `/v1/chat` path, where the client sends its own history).
    pub fn wrap_messages(&self, messages: &[Turn]) -> Vec<Turn> {
        let mut merged = Vec::with_capacity(messages.len() + 1);
        merged.push(Turn::system(self.system_prompt));
        merged.extend_from_slice(messages);
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_history(n: usize) -> Vec<Turn> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Turn::user(format!("вопрос {}", i))
                } else {
                    Turn::assistant(format!("ответ {}", i))
                }
            })
            .collect()
    }

    #[test]
    fn test_flat_prompt_contains_system_history_and_message() {
        let builder = PromptBuilder::new("vitahub", 10);
        let history = vec![Turn::user("привет"), Turn::assistant("здравствуйте")];
        let prompt = builder.render_flat(&history, "что по составу?");

        assert!(prompt.starts_with("Ты виртуальный ассистент VITAHUB"));
        assert!(prompt.contains("Пользователь: привет"));
        assert!(prompt.contains("Ассистент: здравствуйте"));
        assert!(prompt.contains("Пользователь: что по составу?"));
        assert!(prompt.ends_with("Ассистент:"));
    }

    #[test]
    fn test_flat_prompt_caps_history_to_last_ten_turns() {
        let builder = PromptBuilder::new("vitahub", 10);
        let prompt = builder.render_flat(&long_history(14), "ещё вопрос");

        // Turns 0..=3 fall outside the window; 4..=13 stay.
        assert!(!prompt.contains("вопрос 2"));
        assert!(prompt.contains("вопрос 4"));
        assert!(prompt.contains("ответ 13"));
    }

    #[test]
    fn test_structured_messages_order() {
        let builder = PromptBuilder::new("vitahub", 10);
        let history = vec![Turn::user("q"), Turn::assistant("a")];
        let messages = builder.build_messages(&history, "new");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].content, "q");
        assert_eq!(messages[2].content, "a");
        assert_eq!(messages[3].role, Role::User);
        assert_eq!(messages[3].content, "new");
    }

    #[test]
    fn test_company_id_selects_prompt_text() {
        assert!(system_prompt_for("consultant-it").contains("ИТ‑Консультант"));
        assert!(system_prompt_for("vitahub").contains("VITAHUB"));
        assert!(system_prompt_for("unknown").contains("VITAHUB"));
    }

    #[test]
    fn test_wrap_messages_prepends_system() {
        let builder = PromptBuilder::new("consultant-it", 10);
        let wrapped = builder.wrap_messages(&[Turn::user("здравствуйте")]);
        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[0].role, Role::System);
        assert_eq!(wrapped[1].content, "здравствуйте");
    }
}
