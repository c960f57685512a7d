//! 터미널 출력 포맷팅 유틸리티
//!
//! 컨테이너 부팅 과정과 진단 뷰에서 사용되는 터미널 출력 함수들을 제공합니다.
//! 박스 형태의 제목, 진행 단계 표시, 표 형식 출력, 서버 배너 등을 시각적으로 표현합니다.

/// 박스 형태로 둘러싸인 제목을 출력합니다
///
/// Unicode 박스 문자를 사용하여 시각적으로 눈에 띄는 제목을 출력합니다.
/// 텍스트는 자동으로 중앙 정렬됩니다.
///
/// # Arguments
///
/// * `title` - 출력할 제목 문자열
///
/// Output:
/// ```text
/// ╔══════════════════════════════════════════════════╗
/// ║                MIDDLEWARE PIPELINE               ║
/// ╚══════════════════════════════════════════════════╝
/// ```
pub fn print_boxed_title(title: &str) {
    let content_width = 50;
    let border = "═".repeat(content_width);

    println!("╔{}╗", border);
    println!("║{:^50}║", title);
    println!("╚{}╝", border);
}

/// 진행 단계 시작을 표시합니다
///
/// # Examples
///
/// ```rust,ignore
/// print_step_start(1, "Loading container modules");
/// ```
///
/// Output:
/// ```text
/// → Step 1: Loading container modules
/// ```
pub fn print_step_start(step: u8, description: &str) {
    println!("→ Step {}: {}", step, description);
}

/// 진행 단계 완료를 표시합니다
///
/// Output:
/// ```text
/// ✓ Step 1: Container modules loaded (3 items)
/// ```
pub fn print_step_complete(step: u8, description: &str, count: usize) {
    println!("✓ Step {}: {} ({} items)", step, description, count);
}

/// 서브 작업의 상태를 표시합니다
///
/// Output:
/// ```text
///    ├─ bodyParser: Installed
/// ```
pub fn print_sub_task(name: &str, status: &str) {
    println!("   ├─ {}: {}", name, status);
}

/// 헤더와 행 목록을 표 형식으로 렌더링합니다
///
/// 각 열의 너비는 헤더와 셀 중 가장 긴 값(문자 수 기준)에 맞춰집니다.
/// 행의 셀 수가 헤더보다 적으면 빈 칸으로 채웁니다.
///
/// # Arguments
///
/// * `headers` - 열 제목
/// * `rows` - 행 목록
///
/// # Examples
///
/// ```rust,ignore
/// let table = render_table(&["Scope", "Cache"], vec![vec!["Singleton".into(), "Yes".into()]]);
/// ```
///
/// Output:
/// ```text
/// ┌───────────┬───────┐
/// │ Scope     │ Cache │
/// ├───────────┼───────┤
/// │ Singleton │ Yes   │
/// └───────────┴───────┘
/// ```
pub fn render_table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(column, header)| {
            rows.iter()
                .filter_map(|row| row.get(column))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let border = |left: &str, middle: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|width| "─".repeat(width + 2)).collect();
        format!("{}{}{}", left, segments.join(middle), right)
    };

    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(column, width)| {
                let cell = cells.get(column).copied().unwrap_or("");
                let padding = width - cell.chars().count();
                format!(" {}{} ", cell, " ".repeat(padding))
            })
            .collect();
        format!("│{}│", padded.join("│"))
    };

    let mut output = Vec::with_capacity(rows.len() + 4);
    output.push(border("┌", "┬", "┐"));
    output.push(line(headers.to_vec()));
    output.push(border("├", "┼", "┤"));
    for row in &rows {
        output.push(line(row.iter().map(String::as_str).collect()));
    }
    output.push(border("└", "┴", "┘"));

    output.join("\n")
}

/// 표를 터미널에 출력합니다
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    println!("{}", render_table(headers, rows));
}

/// 서버 시작 배너 문자열
pub fn server_banner(app_name: &str, app_version: &str, port: u16, environment: &str) -> String {
    format!(
        "{} version {} is running on port {} - Environment: {}",
        app_name, app_version, port, environment
    )
}

/// 서버 시작 배너를 출력합니다
///
/// Output:
/// ```text
/// ╔══════════════════════════════════════════════════╗
/// ║                  🚀 SERVER READY                 ║
/// ╚══════════════════════════════════════════════════╝
///    my-app version 1.2.0 is running on port 8080 - Environment: development
/// ```
pub fn print_server_banner(app_name: &str, app_version: &str, port: u16, environment: &str) {
    println!();
    print_boxed_title("🚀 SERVER READY");
    println!("   {}", server_banner(app_name, app_version, port, environment));
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_aligns_columns() {
        let table = render_table(
            &["Scope", "Cache"],
            vec![
                vec!["Singleton".to_string(), "Yes".to_string()],
                vec!["Request".to_string(), "No".to_string()],
            ],
        );

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "│ Scope     │ Cache │");
        assert_eq!(lines[3], "│ Singleton │ Yes   │");
        assert_eq!(lines[4], "│ Request   │ No    │");
        assert!(lines.iter().all(|line| line.chars().count() == lines[0].chars().count()));
    }

    #[test]
    fn test_render_table_without_rows() {
        let table = render_table(&["Timestamp", "Path", "Middleware"], Vec::new());
        assert_eq!(table.lines().count(), 4);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = render_table(&["A", "B"], vec![vec!["x".to_string()]]);
        assert!(table.contains("│ x │   │"));
    }

    #[test]
    fn test_server_banner() {
        assert_eq!(
            server_banner("my-app", "1.2.0", 8080, "development"),
            "my-app version 1.2.0 is running on port 8080 - Environment: development"
        );
    }
}
