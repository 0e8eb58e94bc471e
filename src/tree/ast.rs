//! Typed views over the syntax tree.
//!
//! Each struct wraps a [`SyntaxNode`] of one (or a few) kinds and exposes
//! accessors for the children consumers care about.

use super::{SyntaxNode, SyntaxToken};
use crate::base::GrammarKind;
use crate::parser::SyntaxKind;

pub trait AstNode<'t>: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode<'t>) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode<'t>;

    /// Find all descendant nodes of a specific AST type
    fn descendants<T: AstNode<'t>>(&self) -> impl Iterator<Item = T> + use<'t, T, Self> {
        let node = *self.syntax();
        node.descendants().filter_map(T::cast)
    }
}

macro_rules! ast_node {
    ($name:ident, $($kind:ident)|+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name<'t>(pub(crate) SyntaxNode<'t>);

        impl<'t> AstNode<'t> for $name<'t> {
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $(SyntaxKind::$kind)|+)
            }

            fn cast(node: SyntaxNode<'t>) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode<'t> {
                &self.0
            }
        }
    };
}

/// Generate a method returning an iterator over children of a typed view
macro_rules! children_method {
    ($name:ident, $type:ident) => {
        #[doc = concat!("Get all `", stringify!($type), "` children of this node.")]
        pub fn $name(&self) -> impl Iterator<Item = $type<'t>> + 't {
            self.0.children().filter_map($type::cast)
        }
    };
}

fn name_token<'t>(node: &SyntaxNode<'t>) -> Option<SyntaxToken<'t>> {
    node.find_token(SyntaxKind::IDENT)
}

/// Metadata entries attached through the node's embedding regions
fn attached_metadata<'t>(node: &SyntaxNode<'t>) -> impl Iterator<Item = MetadataEntry<'t>> + 't {
    node.children()
        .filter_map(EmbeddingSpan::cast)
        .flat_map(|span| span.entries().collect::<Vec<_>>())
}

// ============================================================================
// Host declarations
// ============================================================================

ast_node!(SourceFile, SOURCE_FILE);

impl<'t> SourceFile<'t> {
    children_method!(declarations, ClassDecl);
}

ast_node!(
    ClassDecl,
    CLASS_DECL | INTERFACE_DECL | ENUM_DECL | TYPEDEF_DECL | ABSTRACT_DECL | TYPE_DECL
);

impl<'t> ClassDecl<'t> {
    pub fn name(&self) -> Option<SyntaxToken<'t>> {
        name_token(&self.0)
    }

    /// Which kind of type this declares
    pub fn decl_kind(&self) -> SyntaxKind {
        self.0.kind()
    }

    pub fn body(&self) -> Option<SyntaxNode<'t>> {
        self.0
            .children()
            .find(|n| matches!(n.kind(), SyntaxKind::CLASS_BODY | SyntaxKind::ENUM_BODY))
    }

    /// Fields and methods, in order
    pub fn members(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
        self.body().into_iter().flat_map(|body| {
            body.children()
                .filter(|n| matches!(n.kind(), SyntaxKind::FIELD_DECL | SyntaxKind::METHOD_DECL))
                .collect::<Vec<_>>()
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldDecl<'t>> + 't {
        self.members().filter_map(FieldDecl::cast)
    }

    pub fn methods(&self) -> impl Iterator<Item = MethodDecl<'t>> + 't {
        self.members().filter_map(MethodDecl::cast)
    }

    pub fn metadata(&self) -> impl Iterator<Item = MetadataEntry<'t>> + 't {
        attached_metadata(&self.0)
    }

    /// The first child when it is a metadata region
    pub fn leading_embedding(&self) -> Option<EmbeddingSpan<'t>> {
        self.0.children().next().and_then(EmbeddingSpan::cast)
    }
}

ast_node!(FieldDecl, FIELD_DECL);

impl<'t> FieldDecl<'t> {
    pub fn name(&self) -> Option<SyntaxToken<'t>> {
        name_token(&self.0)
    }

    pub fn is_final(&self) -> bool {
        self.0.has_token(SyntaxKind::FINAL_KW)
    }

    pub fn is_static(&self) -> bool {
        self.0.has_token(SyntaxKind::STATIC_KW)
    }

    /// Declared type, as written
    pub fn type_annotation(&self) -> Option<SyntaxNode<'t>> {
        self.0.children().find(|n| n.kind() == SyntaxKind::TYPE_ANNOTATION)
    }

    pub fn metadata(&self) -> impl Iterator<Item = MetadataEntry<'t>> + 't {
        attached_metadata(&self.0)
    }
}

ast_node!(MethodDecl, METHOD_DECL);

impl<'t> MethodDecl<'t> {
    /// Method name; `new` for constructors
    pub fn name(&self) -> Option<SyntaxToken<'t>> {
        self.0
            .child_tokens()
            .find(|t| matches!(t.kind(), SyntaxKind::IDENT | SyntaxKind::NEW_KW))
    }

    pub fn params(&self) -> impl Iterator<Item = Param<'t>> + 't {
        self.0
            .children()
            .filter(|n| n.kind() == SyntaxKind::PARAM_LIST)
            .flat_map(|list| list.children().filter_map(Param::cast).collect::<Vec<_>>())
    }

    pub fn body(&self) -> Option<Block<'t>> {
        self.0.children().find_map(Block::cast)
    }

    pub fn metadata(&self) -> impl Iterator<Item = MetadataEntry<'t>> + 't {
        attached_metadata(&self.0)
    }
}

ast_node!(Param, PARAM);

impl<'t> Param<'t> {
    pub fn name(&self) -> Option<SyntaxToken<'t>> {
        name_token(&self.0)
    }

    pub fn is_optional(&self) -> bool {
        self.0.has_token(SyntaxKind::QUESTION)
    }
}

ast_node!(Block, BLOCK);

impl<'t> Block<'t> {
    /// Statement nodes; bare `;` statements are tokens and not listed
    pub fn statements(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
        self.0.children()
    }
}

// ============================================================================
// Metadata
// ============================================================================

ast_node!(EmbeddingSpan, EMBEDDING);

impl<'t> EmbeddingSpan<'t> {
    /// Grammar the region was delegated to
    pub fn grammar(&self) -> GrammarKind {
        GrammarKind::Metadata
    }

    children_method!(entries, MetadataEntry);
}

ast_node!(MetadataEntry, META_ENTRY);

impl<'t> MetadataEntry<'t> {
    /// Dotted name without the sigil, e.g. `native` for `@:native(...)`
    pub fn name(&self) -> Option<String> {
        let name = self.0.children().find(|n| n.kind() == SyntaxKind::META_NAME)?;
        Some(name.child_tokens().map(|t| t.text()).collect())
    }

    /// `@:name` rather than `@name`
    pub fn is_compiler(&self) -> bool {
        self.0.has_token(SyntaxKind::COLON)
    }

    /// Argument expressions inside the parentheses
    pub fn arguments(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
        self.0
            .children()
            .filter(|n| n.kind() == SyntaxKind::META_ARGS)
            .flat_map(|args| args.children().filter(|n| n.kind() != SyntaxKind::ERROR).collect::<Vec<_>>())
    }
}

// ============================================================================
// Build configuration
// ============================================================================

ast_node!(HxmlFile, HXML_FILE);

impl<'t> HxmlFile<'t> {
    children_method!(options, HxmlOption);
    children_method!(comments, HxmlCommentLine);

    /// Every line node, in order
    pub fn lines(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
        self.0.children()
    }
}

ast_node!(HxmlOption, HXML_OPTION);

impl<'t> HxmlOption<'t> {
    pub fn flag(&self) -> Option<SyntaxToken<'t>> {
        self.0.find_token(SyntaxKind::HXML_FLAG)
    }

    pub fn args(&self) -> impl Iterator<Item = SyntaxToken<'t>> + 't {
        self.0.child_tokens().filter(|t| t.kind() == SyntaxKind::HXML_ARG)
    }
}

ast_node!(HxmlCommentLine, HXML_COMMENT_LINE);

impl<'t> HxmlCommentLine<'t> {
    /// Comment text without the marker
    pub fn text(&self) -> Option<&'t str> {
        let token = self.0.find_token(SyntaxKind::HXML_COMMENT)?;
        Some(token.text().trim_start_matches('#').trim())
    }
}
