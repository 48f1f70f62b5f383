//! 페이지 세션 -- 현재 페이지와 입력값을 가진 HTTP 브라우징 상태
//!
//! 세션은 로드된 페이지 본문과 `type` 단계에서 입력된 값을 기억합니다.
//! `click`은 현재 DOM에서 대상 요소를 찾아 링크 이동, 폼 제출, 또는 무동작으로 해석합니다.
//!
//! `scraper::Html`은 `Send`가 아니므로 DOM 해석은 동기 헬퍼 안에서만 수행하고
//! 소유한 결과만 `.await` 너머로 넘깁니다.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{RequestBuilder, Url};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::config::BrowserRunnerConfig;
use crate::error::BrowserRunnerError;

/// 로드된 페이지
#[derive(Debug, Clone)]
pub struct Page {
    /// 리다이렉트 이후 최종 주소
    pub url: Url,
    pub body: String,
}

/// HTTP 페이지 세션
pub struct PageSession {
    client: reqwest::Client,
    config: Arc<BrowserRunnerConfig>,
    page: Option<Page>,
    /// 컨트롤 키(name 또는 id) -> 입력값
    typed: Vec<(String, String)>,
}

/// click 대상의 해석 결과
#[derive(Debug, PartialEq, Eq)]
enum ClickTarget {
    Link(Url),
    Submit(FormSubmission),
    Inert,
}

#[derive(Debug, PartialEq, Eq)]
struct FormSubmission {
    post: bool,
    action: Url,
    fields: Vec<(String, String)>,
}

impl PageSession {
    pub fn new(client: reqwest::Client, config: Arc<BrowserRunnerConfig>) -> Self {
        Self {
            client,
            config,
            page: None,
            typed: Vec::new(),
        }
    }

    /// 현재 페이지
    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    /// 기억된 입력값
    pub fn typed_values(&self) -> &[(String, String)] {
        &self.typed
    }

    /// 주소로 이동합니다.
    pub async fn navigate(&mut self, url: Url) -> Result<(), BrowserRunnerError> {
        let timeout = self.config.navigation_timeout();
        let request = self.client.get(url.clone());
        let page = self.fetch(request, &url, "navigate", timeout).await?;
        self.load(page);
        Ok(())
    }

    /// 셀렉터와 일치하는 요소를 클릭합니다.
    pub async fn click(&mut self, selector: &str) -> Result<(), BrowserRunnerError> {
        let page = self.page.as_ref().ok_or(BrowserRunnerError::NoPage)?;
        let target = resolve_click(page, selector, &self.typed)?;
        let timeout = self.config.interaction_timeout();

        match target {
            ClickTarget::Link(url) => {
                debug!(selector, url = %url, "click follows link");
                let request = self.client.get(url.clone());
                let page = self.fetch(request, &url, "click", timeout).await?;
                self.load(page);
            }
            ClickTarget::Submit(form) => {
                debug!(
                    selector,
                    action = %form.action,
                    post = form.post,
                    fields = form.fields.len(),
                    "click submits form"
                );
                let (request, url) = if form.post {
                    let request = self.client.post(form.action.clone()).form(&form.fields);
                    (request, form.action)
                } else {
                    let mut url = form.action;
                    url.set_query(None);
                    if !form.fields.is_empty() {
                        url.query_pairs_mut().extend_pairs(&form.fields);
                    }
                    (self.client.get(url.clone()), url)
                };
                let page = self.fetch(request, &url, "submit", timeout).await?;
                self.load(page);
            }
            ClickTarget::Inert => {
                debug!(selector, "click has no navigation effect");
            }
        }

        tokio::time::sleep(self.config.settle()).await;
        Ok(())
    }

    /// 입력 컨트롤에 값을 입력합니다.
    pub async fn type_text(&mut self, selector: &str, value: &str) -> Result<(), BrowserRunnerError> {
        let page = self.page.as_ref().ok_or(BrowserRunnerError::NoPage)?;
        let key = resolve_type_target(page, selector)?;
        debug!(selector, key = %key, "value typed");

        match self.typed.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value.to_owned(),
            None => self.typed.push((key, value.to_owned())),
        }

        tokio::time::sleep(self.config.type_settle()).await;
        Ok(())
    }

    /// 설정된 시간만큼 대기합니다.
    pub async fn wait(&self) {
        tokio::time::sleep(self.config.wait()).await;
    }

    fn load(&mut self, page: Page) {
        // 새 문서에서는 이전 입력값이 사라짐
        self.typed.clear();
        self.page = Some(page);
    }

    async fn fetch(
        &self,
        request: RequestBuilder,
        url: &Url,
        operation: &str,
        timeout: Duration,
    ) -> Result<Page, BrowserRunnerError> {
        let limit = self.config.max_page_bytes;
        let load = async {
            let mut response = request
                .send()
                .await
                .map_err(|e| BrowserRunnerError::Transport {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(BrowserRunnerError::HttpStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            if response
                .content_length()
                .is_some_and(|len| len > limit as u64)
            {
                return Err(BrowserRunnerError::PageTooLarge {
                    url: url.to_string(),
                    limit,
                });
            }

            let final_url = response.url().clone();
            let mut body = Vec::new();
            while let Some(chunk) =
                response
                    .chunk()
                    .await
                    .map_err(|e| BrowserRunnerError::Transport {
                        url: url.to_string(),
                        reason: e.to_string(),
                    })?
            {
                if body.len() + chunk.len() > limit {
                    return Err(BrowserRunnerError::PageTooLarge {
                        url: url.to_string(),
                        limit,
                    });
                }
                body.extend_from_slice(&chunk);
            }

            Ok(Page {
                url: final_url,
                body: String::from_utf8_lossy(&body).into_owned(),
            })
        };

        let page = tokio::time::timeout(timeout, load).await.map_err(|_| {
            BrowserRunnerError::Timeout {
                operation: format!("{operation} {url}"),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }
        })??;

        debug!(url = %page.url, bytes = page.body.len(), "page loaded");
        Ok(page)
    }
}

fn parse_selector(selector: &str) -> Result<Selector, BrowserRunnerError> {
    Selector::parse(selector).map_err(|e| BrowserRunnerError::InvalidSelector {
        selector: selector.to_owned(),
        reason: e.to_string(),
    })
}

fn first_match<'a>(html: &'a Html, selector: &str) -> Result<ElementRef<'a>, BrowserRunnerError> {
    let parsed = parse_selector(selector)?;
    html.select(&parsed)
        .next()
        .ok_or_else(|| BrowserRunnerError::ElementNotFound {
            selector: selector.to_owned(),
        })
}

fn resolve_click(
    page: &Page,
    selector: &str,
    typed: &[(String, String)],
) -> Result<ClickTarget, BrowserRunnerError> {
    let html = Html::parse_document(&page.body);
    let element = first_match(&html, selector)?;

    // 링크 안쪽 요소를 클릭해도 링크가 동작함
    let link = element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .chain(std::iter::once(element))
        .find(|el| el.value().name() == "a" && el.value().attr("href").is_some());
    if let Some(link) = link {
        let href = link.value().attr("href").unwrap_or_default().trim();
        if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
            return Ok(ClickTarget::Inert);
        }
        let url = page
            .url
            .join(href)
            .map_err(|e| BrowserRunnerError::InvalidUrl {
                url: href.to_owned(),
                reason: e.to_string(),
            })?;
        return Ok(ClickTarget::Link(url));
    }

    if !is_submit_control(&element) {
        return Ok(ClickTarget::Inert);
    }
    let Some(form) = element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "form")
    else {
        return Ok(ClickTarget::Inert);
    };

    let action = match form.value().attr("action").map(str::trim) {
        Some(action) if !action.is_empty() => {
            page.url
                .join(action)
                .map_err(|e| BrowserRunnerError::InvalidUrl {
                    url: action.to_owned(),
                    reason: e.to_string(),
                })?
        }
        _ => page.url.clone(),
    };
    let post = form
        .value()
        .attr("method")
        .is_some_and(|m| m.trim().eq_ignore_ascii_case("post"));

    let mut fields = form_fields(form, typed);
    if let Some(name) = element.value().attr("name") {
        let value = element.value().attr("value").unwrap_or_default();
        fields.push((name.to_owned(), value.to_owned()));
    }

    Ok(ClickTarget::Submit(FormSubmission {
        post,
        action,
        fields,
    }))
}

fn is_submit_control(el: &ElementRef<'_>) -> bool {
    let kind = el.value().attr("type").map(str::to_ascii_lowercase);
    match el.value().name() {
        "button" => kind.as_deref().is_none_or(|k| k == "submit"),
        "input" => matches!(kind.as_deref(), Some("submit" | "image")),
        _ => false,
    }
}

/// 폼의 제출 필드를 문서 순서대로 모읍니다. 입력된 값이 기본값보다 우선합니다.
fn form_fields(form: ElementRef<'_>, typed: &[(String, String)]) -> Vec<(String, String)> {
    let typed_value = |el: &ElementRef<'_>| {
        let keys = [el.value().attr("name"), el.value().id()];
        keys.into_iter()
            .flatten()
            .find_map(|key| typed.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone()))
    };

    let mut fields = Vec::new();
    for el in form.descendants().filter_map(ElementRef::wrap) {
        let Some(name) = el.value().attr("name") else {
            continue;
        };
        if el.value().attr("disabled").is_some() {
            continue;
        }
        let value = match el.value().name() {
            "input" => {
                let kind = el
                    .value()
                    .attr("type")
                    .unwrap_or("text")
                    .to_ascii_lowercase();
                match kind.as_str() {
                    "submit" | "image" | "button" | "reset" | "file" => continue,
                    "checkbox" | "radio" => {
                        if el.value().attr("checked").is_none() {
                            continue;
                        }
                        el.value().attr("value").unwrap_or("on").to_owned()
                    }
                    _ => typed_value(&el)
                        .unwrap_or_else(|| el.value().attr("value").unwrap_or_default().to_owned()),
                }
            }
            "textarea" => typed_value(&el).unwrap_or_else(|| el.text().collect()),
            "select" => typed_value(&el).unwrap_or_else(|| selected_option(el)),
            _ => continue,
        };
        fields.push((name.to_owned(), value));
    }
    fields
}

fn selected_option(select: ElementRef<'_>) -> String {
    let options: Vec<ElementRef<'_>> = select
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "option")
        .collect();
    options
        .iter()
        .find(|opt| opt.value().attr("selected").is_some())
        .or_else(|| options.first())
        .map(|opt| {
            opt.value()
                .attr("value")
                .map(str::to_owned)
                .unwrap_or_else(|| opt.text().collect::<String>().trim().to_owned())
        })
        .unwrap_or_default()
}

/// 입력 대상 요소를 찾아 값을 기억할 키를 돌려줍니다.
fn resolve_type_target(page: &Page, selector: &str) -> Result<String, BrowserRunnerError> {
    let html = Html::parse_document(&page.body);
    let element = first_match(&html, selector)?;

    let name = element.value().name();
    if !matches!(name, "input" | "textarea" | "select") {
        return Err(BrowserRunnerError::NotInteractable {
            selector: selector.to_owned(),
            reason: format!("<{name}> does not accept text"),
        });
    }
    if element
        .value()
        .attr("type")
        .is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
    {
        return Err(BrowserRunnerError::NotInteractable {
            selector: selector.to_owned(),
            reason: "input is hidden".to_owned(),
        });
    }

    element
        .value()
        .attr("name")
        .or_else(|| element.value().id())
        .map(str::to_owned)
        .ok_or_else(|| BrowserRunnerError::NotInteractable {
            selector: selector.to_owned(),
            reason: "control has no name or id".to_owned(),
        })
}
