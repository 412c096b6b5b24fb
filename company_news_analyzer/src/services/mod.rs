pub mod audio;
pub mod classifier;
pub mod collector;
pub mod processor;
pub mod report;

pub use audio::{AudioService, GoogleTranslator, GoogleTtsSynthesizer, SpeechSynthesizer, Translator};
pub use classifier::{HuggingFaceClassifier, LexiconClassifier, SentimentClassifier};
pub use collector::{NewsCollectorService, NewsFetcher, TextCleaner, TopicExtractor};
pub use processor::ArticleProcessor;
pub use report::NewsReportService;
