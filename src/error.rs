use thiserror::Error;

use crate::services::CompletionError;

/// Why a diet generation attempt did not produce a suggestion.
///
/// `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum DietError {
    #[error("Por favor, adicione ingredientes antes de gerar a dieta.")]
    EmptyIngredientList,

    #[error("Por favor, selecione um nível de atividade física para calcular o TMB e NDC antes de gerar a dieta.")]
    MissingActivityLevel,

    #[error("Por favor, preencha todos os dados para calcular o TMB e NDC antes de gerar a dieta.")]
    IncompleteProfile,

    #[error("Erro: {0}")]
    ExternalService(String),

    /// Carries the transport detail for logs; the user sees a generic message.
    #[error("Houve um erro ao gerar a dieta. Tente novamente.")]
    Network(String),

    #[error("Uma dieta já está sendo gerada. Aguarde a resposta.")]
    AlreadyGenerating,

    #[error("Geração de dieta cancelada.")]
    Cancelled,
}

impl DietError {
    /// Failures detected before any request is sent.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            DietError::EmptyIngredientList
                | DietError::MissingActivityLevel
                | DietError::IncompleteProfile
        )
    }
}

impl From<CompletionError> for DietError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::Api { message, .. } => DietError::ExternalService(message),
            CompletionError::Transport(detail) => DietError::Network(detail),
            CompletionError::MalformedResponse(detail) => DietError::Network(detail),
        }
    }
}
