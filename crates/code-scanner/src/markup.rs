//! 마크업 문서 — 파일 내용을 DOM으로 파싱하고 요소 위치를 추정
//!
//! JSX/TSX/Svelte 파일도 HTML 파서로 관대하게 파싱합니다. 중괄호 표현식은
//! 텍스트나 속성값(`{...}`)으로 남기 때문에 존재 여부 검사에는 충분합니다.
//! Vue 단일 파일 컴포넌트는 `<template>` 블록 바깥을 공백으로 가려
//! 원본과 같은 줄/열 위치를 유지한 채 파싱합니다.
//!
//! 파서는 소스 위치를 제공하지 않으므로, 같은 이름의 요소 중 몇 번째인지를
//! 세어 원문에서 `<name`의 같은 순번 위치를 찾는 방식으로 줄/열을 추정합니다.

use scraper::{ElementRef, Html};

/// 스니펫 최대 길이 (문자)
const MAX_SNIPPET_CHARS: usize = 200;

/// 파싱된 마크업 문서
pub struct MarkupDocument {
    html: Html,
    /// 파싱에 사용한 텍스트 (원본과 바이트 위치가 같음)
    text: String,
    /// 원문에 `<html` 태그가 있는지
    has_html_root: bool,
}

impl MarkupDocument {
    /// 확장자에 맞춰 파일 내용을 파싱합니다.
    pub fn parse(extension: &str, source: &str) -> Self {
        let text = if extension.eq_ignore_ascii_case("vue") {
            mask_outside_template(source)
        } else {
            source.to_owned()
        };
        let has_html_root = find_tag(&text, "html", 0).is_some();
        let html = Html::parse_document(&text);
        Self {
            html,
            text,
            has_html_root,
        }
    }

    /// 원문에 `<html>` 루트가 명시되어 있는지 여부
    ///
    /// 파서는 항상 `<html>`을 합성하므로 원문 기준으로 판단합니다.
    pub fn has_html_root(&self) -> bool {
        self.has_html_root
    }

    /// 문서 순서대로 모든 요소
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
    }

    /// 이름이 일치하는 요소
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = ElementRef<'a>> {
        self.elements().filter(move |el| el.value().name() == name)
    }

    /// 요소의 1부터 시작하는 줄/열을 추정합니다.
    pub fn locate(&self, element: ElementRef<'_>) -> Option<(u32, u32)> {
        let name = element.value().name();
        let ordinal = self
            .elements_named(name)
            .position(|el| el.id() == element.id())?;
        let offset = find_tag(&self.text, name, ordinal)?;
        Some(line_col(&self.text, offset))
    }
}

/// 요소의 여는 태그를 재구성합니다 (길면 잘라냄).
pub fn opening_tag(element: ElementRef<'_>) -> String {
    let mut tag = format!("<{}", element.value().name());
    for (name, value) in element.value().attrs() {
        tag.push_str(&format!(" {name}=\"{value}\""));
    }
    tag.push('>');

    if tag.chars().count() > MAX_SNIPPET_CHARS {
        let mut truncated: String = tag.chars().take(MAX_SNIPPET_CHARS).collect();
        truncated.push_str("...");
        truncated
    } else {
        tag
    }
}

/// `<name` 뒤에 공백, `>`, `/`가 오는 `nth`(0부터) 번째 위치를 찾습니다.
fn find_tag(text: &str, name: &str, nth: usize) -> Option<usize> {
    let lower = text.to_ascii_lowercase();
    let needle = format!("<{name}");
    let bytes = lower.as_bytes();
    let mut seen = 0;
    let mut from = 0;

    while let Some(pos) = lower[from..].find(&needle) {
        let start = from + pos;
        let end = start + needle.len();
        let boundary = bytes
            .get(end)
            .is_none_or(|b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/');
        if boundary {
            if seen == nth {
                return Some(start);
            }
            seen += 1;
        }
        from = end;
    }
    None
}

fn line_col(text: &str, offset: usize) -> (u32, u32) {
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (
        u32::try_from(line).unwrap_or(u32::MAX),
        u32::try_from(column).unwrap_or(u32::MAX),
    )
}

/// Vue SFC의 최상위 `<template>` 내부만 남기고 나머지를 공백으로 가립니다.
///
/// 줄바꿈은 유지하므로 바이트 위치와 줄/열이 원본과 같습니다.
/// `<template>` 블록이 없으면 원본을 그대로 반환합니다.
fn mask_outside_template(source: &str) -> String {
    let lower = source.to_ascii_lowercase();
    let Some(open) = find_tag(source, "template", 0) else {
        return source.to_owned();
    };
    let Some(open_end) = lower[open..].find('>').map(|i| open + i + 1) else {
        return source.to_owned();
    };
    let Some(close) = lower.rfind("</template") else {
        return source.to_owned();
    };
    if close < open_end {
        return source.to_owned();
    }

    let mut masked = String::with_capacity(source.len());
    for (i, c) in source.char_indices() {
        if (open_end..close).contains(&i) || c == '\n' {
            masked.push(c);
        } else {
            // 바이트 위치를 유지하도록 문자 길이만큼 공백
            for _ in 0..c.len_utf8() {
                masked.push(' ');
            }
        }
    }
    masked
}
