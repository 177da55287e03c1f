pub mod html_element;
pub mod http_browser;
pub mod mock_browser;
pub mod webdriver_browser;

mod browser;
pub use browser::{Browser, Element};
pub use html_element::HtmlElement;
pub use http_browser::StaticBrowser;
pub use mock_browser::MockBrowser;
pub use webdriver_browser::WebDriverBrowser;
