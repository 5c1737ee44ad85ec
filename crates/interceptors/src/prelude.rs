pub use crate::{
    adapters::http::{handle_with_chain, AxumReq, AxumRes},
    context::{HandlerCx, ProtoRequest, ProtoResponse, RequestContext},
    errors::InterceptError,
    schema::{Field, Schema},
    stages::{
        authn_map::AuthnMap,
        context_init::ContextInit,
        permit::Permit,
        schema_guard::SchemaGuard,
        Reply, RequestChain, Stage, StageOutcome,
    },
};
