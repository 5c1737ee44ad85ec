pub use crate::{
    ability::{AbilityRule, AbilitySet, Condition, Effect, SubjectMatch},
    authn::{Authenticator, AuthnInput, TokenAuthenticator},
    errors::AuthError,
    model::{Action, Decision, SubjectRef},
    resolver::{AbilityResolver, MemoryAbilityResolver},
    token::{TokenClaims, TokenCodec},
};
