pub mod arena;
pub mod broadcast;
pub mod declaration;
pub mod error;
pub mod node;
pub mod registry;
pub mod value;

pub use arena::{Arena, CollectionId, NodeId};
pub use broadcast::{propagate, BroadcastSink, NullSink, Recorder, Status};
pub use declaration::{
    effective_name, host_declaration, is_refined, refine, refined, value_collection, value_words,
};
pub use error::{AstError, AstResult, RefineError, RefineResult};
pub use node::{DeclarationData, NodeKind, OperatorKind, RefinedDeclaration, Span, TermKind};
pub use registry::{NameRegistry, PropertyName, SetRegistry, ValueGrammar};
pub use value::{tokenize_value, ValueToken};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenizer_basic() {
        let tokens = tokenize_value("1px solid");
        assert_eq!(tokens.len(), 2);
    }
}
