use agency_engine::{
    credential_objects::{CredentialView, CredentialsRefreshed, RevealState},
    db_types::PaymentCredential,
};

use crate::data_objects::CredentialMutation;

/// Renders a mutation result for the admin whose reveal flags are `reveal`.
pub fn mutation_response<S: Into<String>>(
    message: S,
    result: &CredentialsRefreshed,
    reveal: &RevealState,
) -> CredentialMutation {
    CredentialMutation {
        success: true,
        message: message.into(),
        credential: view(&result.changed, reveal),
        credentials: result.credentials.as_ref().map(|list| CredentialView::list(list, reveal)),
    }
}

pub fn view(credential: &PaymentCredential, reveal: &RevealState) -> CredentialView {
    CredentialView::new(credential, reveal.is_revealed(credential.id))
}
