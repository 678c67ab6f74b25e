//! Schema-context documents for the daily e-commerce ledger table.
//!
//! Both services describe the same table to their respective models. The
//! direct pipeline sends [`schema_description`] alongside the question; the
//! managed data agent receives [`agent_system_instruction`] once per request
//! as inline context.

/// Renders the condensed schema and calculation-rules document for a table.
///
/// The document names the columns the generator is expected to use, the
/// derived-metric formulas it must follow, and the metrics that cannot be
/// computed from this table at all.
pub fn schema_description(table_fqn: &str) -> String {
    format!(
        r#"Table: `{table_fqn}`
This table contains a daily summary of e-commerce operations, including sales, advertising, inventory, and product performance for the US marketplace.

Key Columns and Their Common Interpretations:
*   **Identifiers & Attributes:**
    *   `parent` (STRING): General product category or parent grouping. **Primary entity for "program" or "product line" queries.**
    *   `sku` (STRING): Stock Keeping Unit for a specific product variation.
    *   `colour` (STRING), `size` (STRING): Variation attributes.
    *   `child_asin` (STRING): Marketplace identifier for the specific product variation.
    *   `geo` (STRING), `marketplace` (STRING): Region and sales channel (e.g. 'US', 'Amazon').
    *   `f1_analysis` (STRING), `classification` (STRING): Internal performance/replenishment classification codes.
*   **Time Dimension:**
    *   `date_ordered` (DATE): Primary date (YYYY-MM-DD) for daily data.
        *   For weekly trends starting Sunday: use `DATE_TRUNC(date_ordered, WEEK(SUNDAY))` aliased as `week_start_date`.
        *   **"Most Recently Completed Week (CW)" (Sunday-Saturday):**
            `date_ordered >= DATE_SUB(DATE_TRUNC(CURRENT_DATE(), WEEK(SUNDAY)), INTERVAL 1 WEEK)` AND
            `date_ordered < DATE_TRUNC(CURRENT_DATE(), WEEK(SUNDAY))`
        *   **"Previous N Weeks Baseline"** (the N weeks immediately before CW): shift both bounds back by `INTERVAL (1+N) WEEK` and `INTERVAL 1 WEEK` respectively.
        *   Whenever a question involves a week, the week starts from the most recent Sunday before the question date.
*   **Sales & Units Metrics:**
    *   `product_sales` (FLOAT): Revenue attributed to the product itself for shipped items. This is a primary revenue metric.
    *   `bussiness_report_units` (FLOAT): Total units ordered (B2C & B2B). Primary metric for "units sold". (Note: original field name has typo 'bussiness'.)
    *   `profitability_units` (FLOAT): Net units sold after cancellations and refunds.
    *   `quantity_purchased` (INTEGER), `sales` (FLOAT): Gross order-report units and revenue, pre-cancellation.
*   **Advertising Metrics:**
    *   `clicks` (INTEGER): COMBINED Sponsored Products (SP) + Sponsored Display (SD) ad clicks.
    *   `sp_spends` (FLOAT), `sd_spends` (FLOAT): Ad spend by campaign type.
    *   `sp_impressions` (INTEGER), `sd_impressions` (INTEGER): Ad impressions by campaign type.
    *   `sp_ads_attributed_sales` (FLOAT), `sd_ads_attributed_sales` (FLOAT): Ad-attributed revenue (7-day / 14-day attribution windows).
    *   `sp_ads_attributed_units` (INTEGER), `sd_ads_attributed_units` (FLOAT): Ad-attributed units.
*   **Inventory Metrics:**
    *   `total_fba` (INTEGER): Total quantity of available units in FBA. Primary metric for current FBA inventory.
    *   `fba_cost_inventory` (FLOAT): Cost value of FBA inventory.
    *   Other warehouse on-hand columns exist (e.g. `onhand_victorville`, `onhand_bristol`) but FBA quantity is typically used for channel analysis.
*   **Session & Page View Metrics (Traffic):**
    *   `sessions_total` (FLOAT): Total unique user sessions across all platforms for this ASIN's page. Key "traffic" metric.
    *   `page_views_total` (FLOAT): Total page views across all platforms.
*   **Other Financial Metrics:**
    *   `promotional_rebates` (FLOAT): Cost of promotional rebates or discounts. Typically negative.
    *   `selling_fees` (FLOAT), `fba_fees` (FLOAT): Marketplace and fulfillment fees. Typically negative.
    *   `net_sales` (FLOAT): `product_sales + shipping_credits + gift_wrap_credits + promotional_rebates + other`.
    *   `landed_cost` (FLOAT): Total landed cost (COGS) for `profitability_units` sold.
    *   `gross_profit_before_ads` (FLOAT): `(net_sales + selling_fees + fba_fees) - (landed_cost + inventory_storage_fee)`.
*   **Derived Metrics (Calculate these in SQL):**
    *   **Total Ad Spend**: `COALESCE(sp_spends, 0) + COALESCE(sd_spends, 0)`.
    *   **Total Ad Impressions**: `COALESCE(sp_impressions, 0) + COALESCE(sd_impressions, 0)`.
    *   **Total Ad Attributed Sales**: `COALESCE(sp_ads_attributed_sales, 0) + COALESCE(sd_ads_attributed_sales, 0)`.
    *   **Total Ad Attributed Units**: `COALESCE(sp_ads_attributed_units, 0) + COALESCE(sd_ads_attributed_units, 0)`.
    *   **Average Selling Price (ASP)**: `SAFE_DIVIDE(SUM(product_sales), SUM(bussiness_report_units))`.
    *   **Overall Conversion Rate**: `SAFE_DIVIDE(SUM(bussiness_report_units), SUM(sessions_total))`.
    *   **Overall Ad CPC**: `SAFE_DIVIDE(SUM(Total Ad Spend), SUM(clicks))`.
        *   **Note:** SP-specific or SD-specific CPC *cannot* be calculated as `clicks` is a combined total.
    *   **Overall Ad CTR**: `SAFE_DIVIDE(SUM(clicks), SUM(Total Ad Impressions))`.
    *   **ACOS**: `SAFE_DIVIDE(SUM(Total Ad Spend), SUM(Total Ad Attributed Sales))`.
    *   **TACOS**: `SAFE_DIVIDE(SUM(Total Ad Spend), SUM(product_sales))`.
    *   **Organic Sales**: `GREATEST(0, SUM(product_sales) - SUM(Total Ad Attributed Sales))`.
    *   **NOD / WOC**: `SAFE_DIVIDE(AVG(total_fba), average daily (or weekly) bussiness_report_units over a recent representative period)`.
    *   **Impression Share (SP, SD, or total): cannot be calculated** from this table; it lacks market-wide impression data.
*   **Important Considerations:**
    *   Market share, overall marketplace trends, and competitor data are not in this table; queries should focus on your own metrics.
    *   Content-change dates (titles, images) are not tracked. If the user supplies an approximate date, query performance before and after it.
    *   For deals/promotions, use `promotional_rebates` trends as the indicator.
    *   For metrics noted as not calculable, retrieve trends of the related available data instead and let the summary state the limitation.

(Many other columns exist. Focus on the ones most relevant to sales, ads, traffic, and inventory unless a very specific question targets others.)"#
    )
}

/// Renders the system-instruction document sent to the managed data agent.
///
/// Same table, different register: the agent both queries and narrates, so
/// this document also carries summarization and dialogue guidance.
pub fn agent_system_instruction(table_fqn: &str) -> String {
    format!(
        r#"**System Persona & Objective:**
You are a helpful and insightful data analyst assistant. Your primary goal is to answer questions about sales, advertising, inventory, and product performance by querying the `{table_fqn}` table. Provide data-driven answers, highlight trends, enable comparisons, and clearly explain how to interpret the data you provide. Be mindful of the limitations of direct causal attribution. Whenever a question involves a week, the week starts from the most recent Sunday before the question date.

**Key Columns:**
*   `parent`: product category or parent grouping, also referred to as a "program". Primary entity for "program" or "product line" queries.
*   `sku`, `child_asin`, `colour`, `size`: product-variation identifiers and attributes.
*   `f1_analysis`, `classification`: internal performance/replenishment classifications (e.g. 'High Top' maps to classification 'Runners').
*   `date_ordered`: primary daily date. Weekly: `DATE_TRUNC(date_ordered, WEEK) AS week_start_date`; monthly: `DATE_TRUNC(date_ordered, MONTH) AS month_start_date`.
*   `product_sales`: net revenue from shipped goods (primary revenue metric). `bussiness_report_units`: total units ordered (primary units metric). `profitability_units`: net units after cancellations and refunds.
*   `sp_spends`, `sd_spends`, `clicks`, `sp_impressions`, `sd_impressions`, `sp_ads_attributed_sales`, `sd_ads_attributed_sales`: advertising spend, engagement, and attribution.
*   `total_fba`: sellable FBA inventory quantity. `on_sea_quantity`: stock in transit. `onhand_victorville`, `onhand_bristol`: active buffer 3PL stock.
*   `deal_type`: active promotion on the date, if any (null means no deal). `promotional_rebates`: promotion cost, typically negative.
*   `sessions_total`, `page_views_total`: customer engagement with the product page.
*   `selling_fees`, `fba_fees`, `landed_cost`, `net_sales`, `gross_profit_before_ads`: financial and profitability detail.

**Querying and Analysis Guidelines:**
1.  Identify the primary entities, key metrics, timeframe, and analytical intent. Terms like "program" refer to the `parent` column unless specified otherwise.
2.  For "why" or trend questions about sessions, units, or sales, also retrieve the explanatory factors for the same periods: total ad spend (`sp_spends + sd_spends`), ASP components, `AVG(total_fba)`, and `deal_type` if relevant.
3.  Use SUM for transactional data and AVG for inventory-style metrics. For time-series output, `ORDER BY entity, time_period ASC`.
4.  In textual answers, discuss correlations as *potential contributing factors*; avoid definitive causation unless the data carries explicit attribution (e.g. `sp_ads_attributed_sales`). Do not claim to quantify exactly how many units changed solely because of one factor.
5.  For stock-out or weeks-of-cover questions: WoC = current `total_fba` (plus relevant buffer 3PL stock) divided by average recent weekly sales. State that this is an estimate based on past trends.
6.  For deal questions, compare aggregated metrics during the deal against non-deal baselines for the same products.
7.  Use the conversation history to interpret follow-up questions, and end textual responses with an invitation for further refinement.
8.  If a term is ambiguous, state the assumption made. If a question is beyond the data's scope (forecasting, competitors), state the limitation and offer the most relevant available data.
9.  For general overview requests ("what can you tell me about this data?"), respond with a structured textual description of the dataset's categories and analytical potential; do not generate a query."#
    )
}
