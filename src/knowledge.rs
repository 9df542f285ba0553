//! The static Shoplite knowledge base.
//!
//! Documents are compiled into the binary and never change while the process runs.

use serde::{Deserialize, Serialize};

/// A support document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier (e.g. `doc2`).
    pub id: String,
    /// Title reported as an answer source.
    pub title: String,
    /// Text that is embedded and handed to the model as context.
    pub content: String,
}

impl Document {
    pub fn new(id: &str, title: &str, content: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
        }
    }
}

/// Fixed, ordered document collection.
///
/// Position `i` here is position `i` in the similarity index.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    documents: Vec<Document>,
}

impl KnowledgeBase {
    /// Wrap an ordered set of documents.
    pub fn from_documents(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// The reference Shoplite knowledge base.
    pub fn shoplite() -> Self {
        Self::from_documents(vec![
            Document::new(
                "doc1",
                "Shoplite Registration",
                "To register on Shoplite, buyers provide name, email, and password. Email verification required within 24 hours. Sellers need business documents, tax ID, bank info. Verification takes 2-3 days.",
            ),
            Document::new(
                "doc2",
                "Shoplite Returns",
                "Returns accepted within 14 days if unused with original packaging. Digital downloads and personalized items non-returnable. Refunds processed in 5-7 days to original payment method.",
            ),
            Document::new(
                "doc3",
                "Shoplite Shipping",
                "We offer Standard (5-7 days, $5.99), Express (2-3 days, $12.99), and Overnight ($24.99) shipping. Free shipping on orders over $50.",
            ),
            Document::new(
                "doc4",
                "Shoplite Payment",
                "We accept credit cards, PayPal, and mobile wallets. All payments are encrypted and secure. Refunds are processed to the original payment method.",
            ),
            Document::new(
                "doc5",
                "Shoplite Support",
                "Contact us via email, live chat, or phone. Support hours are 9 AM to 6 PM EST. We respond to emails within 24 hours and live chat within 5 minutes.",
            ),
        ])
    }

    pub fn get(&self, position: usize) -> Option<&Document> {
        self.documents.get(position)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Document contents in index order, ready for batch embedding.
    pub fn contents(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.content.clone()).collect()
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::shoplite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_knowledge_base() {
        let kb = KnowledgeBase::shoplite();
        assert_eq!(kb.len(), 5);
        assert_eq!(kb.get(1).unwrap().id, "doc2");
        assert_eq!(kb.get(1).unwrap().title, "Shoplite Returns");
        assert!(kb.get(5).is_none());
    }

    #[test]
    fn test_contents_follow_document_order() {
        let kb = KnowledgeBase::shoplite();
        let contents = kb.contents();
        assert_eq!(contents.len(), kb.len());
        for (content, doc) in contents.iter().zip(kb.documents()) {
            assert_eq!(content, &doc.content);
        }
    }
}
