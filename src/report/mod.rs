//! The extraction-and-filtering pipeline that turns a feed snapshot into a
//! dated stress-test report.
//!
//! Everything in here is a pure function of its inputs. "Today" is never read
//! from the clock inside the pipeline; callers pass it in through
//! [`QualificationCriteria`].

mod assemble;
mod criteria;
mod extract;
pub mod html;
mod keywords;
mod qualify;

pub use assemble::{
    assemble, discover_date, page_for, DetailBlock, DisplayText, Page, Report, SummaryEntry,
};
pub use criteria::{KeywordSet, QualificationCriteria};
pub use extract::{format_date, strip_title_tags, DatePattern, PathPattern};
pub use keywords::match_keywords;
pub use qualify::qualify;
