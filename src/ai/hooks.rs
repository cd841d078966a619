//! Hook-writing styles used to steer content generation.

use rand::seq::SliceRandom;

const TOPIC: &str = "{topic}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: &'static str,
    system: &'static str,
}

impl PromptTemplate {
    /// System prompt with the topic filled in.
    pub fn render(&self, topic: &str) -> String {
        self.system.replace(TOPIC, topic.trim())
    }
}

static CATALOG: &[PromptTemplate] = &[
    PromptTemplate {
        name: "curiosity",
        system: "You write Instagram hooks. Write 5 short opening lines about \"{topic}\" \
                 that open a curiosity gap the reader must close by reading on. \
                 One hook per line, no numbering, in Persian.",
    },
    PromptTemplate {
        name: "pain_point",
        system: "You write Instagram hooks. Write 5 opening lines about \"{topic}\" \
                 that name a specific frustration the audience feels and promise relief. \
                 One hook per line, no numbering, in Persian.",
    },
    PromptTemplate {
        name: "contrarian",
        system: "You write Instagram hooks. Write 5 opening lines about \"{topic}\" \
                 that challenge a common belief with a bold, defensible claim. \
                 One hook per line, no numbering, in Persian.",
    },
    PromptTemplate {
        name: "story",
        system: "You write Instagram hooks. Write 5 opening lines about \"{topic}\" \
                 that start a short personal story in the first person. \
                 One hook per line, no numbering, in Persian.",
    },
    PromptTemplate {
        name: "listicle",
        system: "You write Instagram hooks. Write 5 opening lines about \"{topic}\" \
                 that promise a concrete numbered list of tips or mistakes. \
                 One hook per line, no numbering, in Persian.",
    },
];

pub fn catalog() -> &'static [PromptTemplate] {
    CATALOG
}

/// Uniformly random style.
pub fn random() -> &'static PromptTemplate {
    CATALOG
        .choose(&mut rand::thread_rng())
        .unwrap_or(&CATALOG[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_template_takes_the_topic() {
        for template in catalog() {
            let rendered = template.render("  morning coffee ");
            assert!(rendered.contains("\"morning coffee\""), "{}", template.name);
            assert!(!rendered.contains(TOPIC));
        }
    }

    #[test]
    fn random_covers_the_catalog() {
        let seen: HashSet<_> = (0..500).map(|_| random().name).collect();
        assert_eq!(seen.len(), catalog().len());
    }
}
