//! Production names of the grammar tree

macro_rules! productions {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// One production of the tree grammar the walker follows
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Production {
            $($variant),+
        }

        impl Production {
            /// Every production, in declaration order
            pub const ALL: &'static [Production] = &[$(Production::$variant),+];

            /// Name used for lookup by name
            pub fn name(self) -> &'static str {
                match self {
                    $(Production::$variant => $name),+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Production::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

productions! {
    GrammarSpec => "grammarSpec",
    PrequelConstructs => "prequelConstructs",
    PrequelConstruct => "prequelConstruct",
    OptionsSpec => "optionsSpec",
    OptionDef => "option",
    OptionValue => "optionValue",
    DelegateGrammars => "delegateGrammars",
    DelegateGrammar => "delegateGrammar",
    TokensSpec => "tokensSpec",
    TokenSpec => "tokenSpec",
    ChannelsSpec => "channelsSpec",
    ChannelSpec => "channelSpec",
    Action => "action",
    Rules => "rules",
    Mode => "mode",
    LexerRule => "lexerRule",
    Rule => "rule",
    ExceptionGroup => "exceptionGroup",
    ExceptionHandler => "exceptionHandler",
    FinallyClause => "finallyClause",
    Locals => "locals",
    RuleReturns => "ruleReturns",
    ThrowsSpec => "throwsSpec",
    RuleAction => "ruleAction",
    RuleModifier => "ruleModifier",
    LexerRuleBlock => "lexerRuleBlock",
    RuleBlock => "ruleBlock",
    LexerOuterAlternative => "lexerOuterAlternative",
    OuterAlternative => "outerAlternative",
    LexerAlternative => "lexerAlternative",
    LexerElements => "lexerElements",
    LexerElement => "lexerElement",
    LexerBlock => "lexerBlock",
    LexerAtom => "lexerAtom",
    Alternative => "alternative",
    LexerCommand => "lexerCommand",
    LexerCommandExpr => "lexerCommandExpr",
    Element => "element",
    LabeledElement => "labeledElement",
    Subrule => "subrule",
    LexerSubrule => "lexerSubrule",
    BlockSuffix => "blockSuffix",
    EbnfSuffix => "ebnfSuffix",
    Atom => "atom",
    BlockSet => "blockSet",
    SetElement => "setElement",
    Block => "block",
    Ruleref => "ruleref",
    Range => "range",
    Terminal => "terminal",
    ElementOptions => "elementOptions",
    ElementOption => "elementOption",
    ActionElement => "actionElement",
}

impl std::fmt::Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for production in Production::ALL {
            assert_eq!(Production::from_name(production.name()), Some(*production));
        }
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(Production::from_name("grammarSpecs"), None);
        assert_eq!(Production::from_name("GrammarSpec"), None);
    }

    #[test]
    fn test_count() {
        assert_eq!(Production::ALL.len(), 53);
    }
}
