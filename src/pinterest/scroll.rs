use std::time::Duration;

use anyhow::Result;
use log::debug;

/// The part of a browser page the scroll loop needs.
pub trait ScrollPage {
    async fn scroll_height(&mut self) -> Result<u64>;
    async fn scroll_to_bottom(&mut self) -> Result<()>;
}

pub struct ScrollOpts {
    // How long to wait after each scroll for new content to load
    pub delay: Duration,

    // Upper bound on scroll rounds. `None` keeps scrolling until the page height stops changing.
    pub max_rounds: Option<usize>,
}

#[derive(Debug, Eq, PartialEq)]
pub enum ScrollEnd {
    // Two consecutive height readings were equal
    Settled { rounds: usize },

    // The round limit was reached while the page was still growing
    Capped { rounds: usize },
}

/// Scrolls to the bottom of the page until it stops growing, so that lazily loaded content is all in the DOM.
///
/// After every scroll the loop waits `opts.delay` and reads the height again; it ends on the first reading that
/// equals the previous one.
pub async fn scroll_to_end<P: ScrollPage>(page: &mut P, opts: &ScrollOpts) -> Result<ScrollEnd> {
    let mut last_height = page.scroll_height().await?;
    let mut rounds = 0;

    loop {
        if let Some(max) = opts.max_rounds {
            if rounds >= max {
                return Ok(ScrollEnd::Capped { rounds });
            }
        }

        page.scroll_to_bottom().await?;
        tokio::time::sleep(opts.delay).await;
        rounds += 1;

        let new_height = page.scroll_height().await?;
        debug!("scroll round {}: height {} -> {}", rounds, last_height, new_height);

        if new_height == last_height {
            return Ok(ScrollEnd::Settled { rounds });
        }
        last_height = new_height;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::Result;

    use super::{scroll_to_end, ScrollEnd, ScrollOpts, ScrollPage};

    // Replays a fixed sequence of heights; the last one repeats forever.
    struct FakePage {
        heights: Vec<u64>,
        reads: usize,
        scrolls: usize,
    }

    impl FakePage {
        fn new(heights: &[u64]) -> Self {
            FakePage {
                heights: heights.to_vec(),
                reads: 0,
                scrolls: 0,
            }
        }
    }

    impl ScrollPage for FakePage {
        async fn scroll_height(&mut self) -> Result<u64> {
            let idx = self.reads.min(self.heights.len() - 1);
            self.reads += 1;
            Ok(self.heights[idx])
        }

        async fn scroll_to_bottom(&mut self) -> Result<()> {
            self.scrolls += 1;
            Ok(())
        }
    }

    fn opts(max_rounds: Option<usize>) -> ScrollOpts {
        ScrollOpts {
            delay: Duration::ZERO,
            max_rounds,
        }
    }

    #[tokio::test]
    async fn stops_on_first_equal_reading() {
        let mut page = FakePage::new(&[1000, 1000]);
        let end = scroll_to_end(&mut page, &opts(None)).await.unwrap();

        assert_eq!(end, ScrollEnd::Settled { rounds: 1 });
        assert_eq!(page.scrolls, 1);
        assert_eq!(page.reads, 2);
    }

    #[tokio::test]
    async fn keeps_scrolling_while_page_grows() {
        let mut page = FakePage::new(&[1000, 2000, 2500, 3000, 3000, 4000]);
        let end = scroll_to_end(&mut page, &opts(None)).await.unwrap();

        // 1000 -> 2000 -> 2500 -> 3000 -> 3000; the 4000 is never read
        assert_eq!(end, ScrollEnd::Settled { rounds: 4 });
        assert_eq!(page.scrolls, 4);
        assert_eq!(page.reads, 5);
    }

    #[tokio::test]
    async fn a_repeated_height_that_is_not_consecutive_does_not_stop() {
        let mut page = FakePage::new(&[1000, 2000, 1000, 3000, 3000]);
        let end = scroll_to_end(&mut page, &opts(None)).await.unwrap();

        assert_eq!(end, ScrollEnd::Settled { rounds: 4 });
    }

    #[tokio::test]
    async fn round_limit_bounds_a_growing_page() {
        let heights: Vec<u64> = (1..=100).map(|i| i * 1000).collect();
        let mut page = FakePage::new(&heights);
        let end = scroll_to_end(&mut page, &opts(Some(3))).await.unwrap();

        assert_eq!(end, ScrollEnd::Capped { rounds: 3 });
        assert_eq!(page.scrolls, 3);
    }

    #[tokio::test]
    async fn round_limit_does_not_hide_settling() {
        let mut page = FakePage::new(&[1000, 2000, 2000]);
        let end = scroll_to_end(&mut page, &opts(Some(5))).await.unwrap();

        assert_eq!(end, ScrollEnd::Settled { rounds: 2 });
    }
}
