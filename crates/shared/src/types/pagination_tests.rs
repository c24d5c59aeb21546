use super::*;

#[test]
fn test_page_request_default() {
    let request = PageRequest::default();
    assert_eq!(request.page, 1);
    assert_eq!(request.per_page, 20);
}

#[test]
fn test_page_request_offset() {
    let request = PageRequest {
        page: 1,
        per_page: 20,
    };
    assert_eq!(request.offset(), 0);

    let request = PageRequest {
        page: 2,
        per_page: 20,
    };
    assert_eq!(request.offset(), 20);
}

#[test]
fn test_page_request_limit() {
    let request = PageRequest {
        page: 1,
        per_page: 50,
    };
    assert_eq!(request.limit(), 50);
}

#[test]
fn test_page_response_new() {
    let data = vec![1, 2, 3];
    let response = PageResponse::new(data.clone(), 1, 10, 3);

    assert_eq!(response.data, data);
    assert_eq!(response.meta.page, 1);
    assert_eq!(response.meta.per_page, 10);
    assert_eq!(response.meta.total, 3);
    assert_eq!(response.meta.total_pages, 1);
}

#[test]
fn test_page_response_pagination() {
    // 25 items, 10 per page -> 3 pages
    let response: PageResponse<i32> = PageResponse::new(vec![], 1, 10, 25);
    assert_eq!(response.meta.total_pages, 3);
}

#[test]
fn test_page_response_empty() {
    let response: PageResponse<i32> = PageResponse::new(vec![], 1, 10, 0);
    assert_eq!(response.meta.total_pages, 1);
}

#[test]
fn test_page_request_normalized_clamps() {
    let request = PageRequest {
        page: 0,
        per_page: 10_000,
    }
    .normalized();
    assert_eq!(request.page, 1);
    assert_eq!(request.per_page, MAX_PER_PAGE);

    let request = PageRequest {
        page: 3,
        per_page: 0,
    }
    .normalized();
    assert_eq!(request.page, 3);
    assert_eq!(request.per_page, 1);
}

#[test]
fn test_paginate_slices_ordered_items() {
    let request = PageRequest {
        page: 2,
        per_page: 2,
    };
    let page = request.paginate(vec!["a", "b", "c", "d", "e"]);
    assert_eq!(page.data, vec!["c", "d"]);
    assert_eq!(page.meta.total, 5);
    assert_eq!(page.meta.total_pages, 3);
}

#[test]
fn test_paginate_past_end_is_empty() {
    let request = PageRequest {
        page: 9,
        per_page: 10,
    };
    let page = request.paginate(vec![1, 2, 3]);
    assert!(page.data.is_empty());
    assert_eq!(page.meta.total, 3);
}
