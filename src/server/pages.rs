//! HTML bodies for the index and completion pages

use crate::dispatcher::Completion;
use crate::profile::PROFILE_TABLE;
use std::fmt::Write;

const TITLE: &str = "Benchmark Stub";
const SOURCE_URL: &str = "https://github.com/jopereira/bmstub";

/// Root page listing every profile endpoint
pub fn index() -> String {
    let mut items = String::new();
    for entry in PROFILE_TABLE.iter() {
        // Writing to a String cannot fail
        let _ = writeln!(items, "<li><a href=\"{}\">{}</a></li>", entry.path, entry.name);
    }
    document(&format!(
        "<h1>{}</h1>\n<h2>Request types</h2>\n<ul>\n{}</ul>\n\
         <h2>More info...</h2>\nSee source code and documentation in <a href=\"{}\">github</a>.",
        TITLE, items, SOURCE_URL
    ))
}

/// Page returned once a request's delay is over
pub fn completion(completion: &Completion) -> String {
    document(&format!(
        "<p>Request {} of type {} executed.</p>\n<p><a href=\"/\">Back</a></p>",
        completion.index,
        completion.profile.name()
    ))
}

fn document(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        TITLE, body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileKind;
    use crate::worker::RequestIndex;
    use std::time::Duration;

    #[test]
    fn test_index_lists_every_profile() {
        let page = index();
        assert!(page.contains("<title>Benchmark Stub</title>"));
        assert!(page.contains("<h2>Request types</h2>"));
        assert!(page.contains("<h2>More info...</h2>"));
        assert!(page.contains("<a href=\"https://github.com/jopereira/bmstub\">github</a>"));
        for kind in ProfileKind::ALL {
            let link = format!("<a href=\"{}\">{}</a>", kind.path(), kind.name());
            assert!(page.contains(&link), "missing {}", link);
        }
        // Listed in table order
        let constant = page.find("/constant").unwrap();
        let bimodal = page.find("/bimodal").unwrap();
        assert!(constant < bimodal);
    }

    #[test]
    fn test_completion_reports_own_index() {
        let page = completion(&Completion {
            index: RequestIndex::new(41),
            profile: ProfileKind::LongTail,
            delay: Duration::from_millis(3),
            observed: Duration::from_millis(3),
            interrupted: false,
        });
        assert!(page.contains("Request 41 of type LongTail executed."));
        assert!(page.contains("<a href=\"/\">"));
    }
}
