//! 공통 유틸리티 함수 모듈
//!
//! # Modules
//!
//! - [`display_terminal`] - 터미널 출력 포맷팅 함수들 (단계 로그, 진단 테이블, 서버 배너)
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::utils::display_terminal::{print_boxed_title, print_table};
//!
//! print_boxed_title("CONTAINER BINDINGS");
//! print_table(&["Service Identifier", "Scope"], rows);
//! ```

pub mod display_terminal;
