//! The fixed example corpus shown by the demo.

use crate::constants::MAX_COMPLEXITY;

/// One natural-language question and the SQL it turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Example {
    pub question: &'static str,
    pub sql: &'static str,
    /// Rating in `0..=MAX_COMPLEXITY`, shown as filled dots
    pub complexity: u8,
}

/// Examples in display order. The cycler wraps around at the end.
pub const EXAMPLES: [Example; 3] = [
    Example {
        question: "Show me the top 5 customers by order count in London.",
        sql: "SELECT c.companyName, COUNT(o.orderID) AS order_count\n\
FROM customers c\n\
JOIN orders o ON c.customerID = o.customerID\n\
WHERE c.city = 'London'\n\
GROUP BY c.companyName\n\
ORDER BY order_count DESC\n\
LIMIT 5;",
        complexity: 1,
    },
    Example {
        question: "What's the average order value by customer segment this quarter?",
        sql: "SELECT \n  c.segment,\n  AVG(od.unitPrice * od.quantity) as avg_order_value,\n  \
COUNT(DISTINCT o.orderID) as total_orders\n\
FROM customers c\n\
JOIN orders o ON c.customerID = o.customerID\n\
JOIN order_details od ON o.orderID = od.orderID\n\
WHERE EXTRACT(QUARTER FROM o.orderDate) = EXTRACT(QUARTER FROM CURRENT_DATE)\n  \
AND EXTRACT(YEAR FROM o.orderDate) = EXTRACT(YEAR FROM CURRENT_DATE)\n\
GROUP BY c.segment\n\
ORDER BY avg_order_value DESC;",
        complexity: 2,
    },
    Example {
        question: "Show Q4 revenue by customer segment with year-over-year comparison",
        sql: "WITH quarterly_revenue AS (\n  SELECT \n    c.segment,\n    \
EXTRACT(YEAR FROM o.orderDate) as year,\n    \
SUM(od.unitPrice * od.quantity) as revenue\n  \
FROM customers c\n  \
JOIN orders o ON c.customerID = o.customerID\n  \
JOIN order_details od ON o.orderID = od.orderID\n  \
WHERE EXTRACT(QUARTER FROM o.orderDate) = 4\n  \
GROUP BY c.segment, EXTRACT(YEAR FROM o.orderDate)\n\
)\n\
SELECT \n  qr.segment,\n  \
COALESCE(current_year.revenue, 0) as q4_2024_revenue,\n  \
COALESCE(previous_year.revenue, 0) as q4_2023_revenue,\n  \
ROUND(\n    \
((COALESCE(current_year.revenue, 0) - COALESCE(previous_year.revenue, 0)) \n     \
/ NULLIF(previous_year.revenue, 0)) * 100, 2\n  \
) as yoy_growth_percent\n\
FROM (SELECT DISTINCT segment FROM quarterly_revenue) qr\n\
LEFT JOIN quarterly_revenue current_year ON qr.segment = current_year.segment AND current_year.year = 2024\n\
LEFT JOIN quarterly_revenue previous_year ON qr.segment = previous_year.segment AND previous_year.year = 2023\n\
ORDER BY q4_2024_revenue DESC;",
        complexity: 3,
    },
];

/// Example at `index`, wrapping past the end.
pub fn example(index: usize) -> &'static Example {
    &EXAMPLES[index % EXAMPLES.len()]
}

/// Index following `index` in the cycle.
pub fn next_index(index: usize) -> usize {
    (index + 1) % EXAMPLES.len()
}
