/*!
Predefined workflow actions.

Each action is submitted as a one-step workflow definition:
  { "actionType": "<kind>", ...params }
`st.*` actions run against standard LinkedIn, `nv.*` against Sales Navigator.
*/

use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    FetchPerson,
    FetchCompany,
    SearchCompanies,
    SearchPeople,
    SendMessage,
    SyncConversation,
    SendConnectionRequest,
    CheckConnectionStatus,
    WithdrawConnectionRequest,
    RetrieveConnections,
    RetrievePendingRequests,
    RemoveConnection,
    FetchPost,
    ReactToPost,
    CommentOnPost,
    CreatePost,
    RetrieveSsi,
    RetrievePerformance,
    NvFetchPerson,
    NvFetchCompany,
    NvSearchPeople,
    NvSearchCompanies,
    NvSendMessage,
    NvSyncConversation,
}

impl Action {
    pub fn action_type(&self) -> &'static str {
        match self {
            Action::FetchPerson => "st.openPersonPage",
            Action::FetchCompany => "st.openCompanyPage",
            Action::SearchCompanies => "st.searchCompanies",
            Action::SearchPeople => "st.searchPeople",
            Action::SendMessage => "st.sendMessage",
            Action::SyncConversation => "st.syncConversation",
            Action::SendConnectionRequest => "st.sendConnectionRequest",
            Action::CheckConnectionStatus => "st.checkConnectionStatus",
            Action::WithdrawConnectionRequest => "st.withdrawConnectionRequest",
            Action::RetrieveConnections => "st.retrieveConnections",
            Action::RetrievePendingRequests => "st.retrievePendingRequests",
            Action::RemoveConnection => "st.removeConnection",
            Action::FetchPost => "st.openPost",
            Action::ReactToPost => "st.reactToPost",
            Action::CommentOnPost => "st.commentOnPost",
            Action::CreatePost => "st.createPost",
            Action::RetrieveSsi => "st.retrieveSSI",
            Action::RetrievePerformance => "st.retrievePerformance",
            Action::NvFetchPerson => "nv.openPersonPage",
            Action::NvFetchCompany => "nv.openCompanyPage",
            Action::NvSearchPeople => "nv.searchPeople",
            Action::NvSearchCompanies => "nv.searchCompanies",
            Action::NvSendMessage => "nv.sendMessage",
            Action::NvSyncConversation => "nv.syncConversation",
        }
    }

    /// Wrap `params` into a workflow definition. Non-object params are
    /// ignored; the action then runs with no parameters.
    pub fn definition(&self, params: Value) -> Value {
        let mut def = Map::new();
        def.insert("actionType".into(), Value::String(self.action_type().into()));
        if let Value::Object(fields) = params {
            for (k, v) in fields {
                if k != "actionType" {
                    def.insert(k, v);
                }
            }
        }
        Value::Object(def)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn definition_merges_params() {
        let def = Action::SendMessage.definition(json!({
            "personUrl": "https://www.linkedin.com/in/john-doe",
            "text": "Hello"
        }));
        assert_eq!(
            def,
            json!({
                "actionType": "st.sendMessage",
                "personUrl": "https://www.linkedin.com/in/john-doe",
                "text": "Hello"
            })
        );
    }

    #[test]
    fn params_cannot_override_action_type() {
        let def = Action::RetrieveSsi.definition(json!({"actionType": "st.somethingElse"}));
        assert_eq!(def, json!({"actionType": "st.retrieveSSI"}));
    }

    #[test]
    fn null_params_yield_bare_action() {
        let def = Action::RetrievePendingRequests.definition(Value::Null);
        assert_eq!(def, json!({"actionType": "st.retrievePendingRequests"}));
    }

    #[test]
    fn navigator_actions_use_nv_prefix() {
        assert!(Action::NvSyncConversation.to_string().starts_with("nv."));
        assert!(Action::SyncConversation.to_string().starts_with("st."));
    }
}
