use super::ai_service::{ChatMessage, ChatRequest};
use crate::models::IngredientList;

const SYSTEM_PROMPT: &str = "Você é um especialista em nutrição e sugere dietas personalizadas.";

/// Meal sections requested from the model, in serving order, with the
/// phrase used in each subtotal line.
pub const MEAL_SECTIONS: [(&str, &str); 6] = [
    ("Café da Manhã", "no café da manhã"),
    ("Lanche da Manhã", "no lanche da manhã"),
    ("Almoço", "no almoço"),
    ("Lanche da Tarde", "no lanche da tarde"),
    ("Jantar", "no jantar"),
    ("Ceia", "na ceia"),
];

/// Model parameters that do not depend on the form.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 500,
            temperature: 0.7,
        }
    }
}

pub fn build_user_prompt(ingredients: &IngredientList, daily_kcal: i64) -> String {
    let mut prompt = format!(
        "Baseado nos seguintes ingredientes: {}, sugira uma dieta personalizada de {} Kcal totais \
         no seguinte formato de resposta:\n\n\
         **Sugestão de Dieta:**\n\
         Com base nas informações fornecidas, sugiro a seguinte dieta personalizada:\n\n",
        ingredients.joined(),
        daily_kcal
    );

    for (title, subtotal) in MEAL_SECTIONS {
        prompt.push_str(&format!(
            "=={}==\n\
             - [alimentos sugeridos com base na lista e no NDC]\n\
             **Total de Kcal {}:** XXX kcal\n\n",
            title, subtotal
        ));
    }

    prompt.push_str(
        "**Total de calorias da dieta:** XXXX kcal\n\n\
         Para melhorar a dieta, você pode adicionar mais alimentos saudáveis.\n\n\
         Se necessário, preencha os dados novamente e gere outra sugestão personalizada.",
    );
    prompt
}

pub fn build_diet_request(
    settings: &CompletionSettings,
    ingredients: &IngredientList,
    daily_kcal: i64,
) -> ChatRequest {
    ChatRequest {
        model: settings.model.clone(),
        messages: vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_user_prompt(ingredients, daily_kcal)),
        ],
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    }
}
